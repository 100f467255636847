//! Meeting schedule. Producer of the `meetings` shared artifact consumed by
//! the mail gateway generator (invite traffic).

use super::{GeneratorContext, GeneratorError, GeneratorReport};
use crate::artifact::MeetingRecord;
use rand::Rng;

const CATEGORY: &str = "business";

const SUBJECTS: [&str; 6] = [
    "Weekly sync",
    "Quarterly planning",
    "Smelter-suite roadmap",
    "Customer escalation review",
    "1:1",
    "Release go/no-go",
];

pub fn run(ctx: &GeneratorContext) -> Result<GeneratorReport, GeneratorError> {
    let company = &ctx.config.company;
    let mut records: Vec<MeetingRecord> = Vec::new();

    for (_, date, hour) in ctx.hours() {
        // Meetings only book during office hours, a thin slice of the
        // business volume curve.
        if !(8..18).contains(&hour) {
            continue;
        }
        let mut rng = ctx.rng(date, CATEGORY, &format!("meetings:{hour}"));
        let count = (ctx.baseline_count(CATEGORY, date, hour) / 20).max(1);

        for _ in 0..count {
            let organizer = &company.users[rng.gen_range(0..company.users.len())];
            let attendee_count = rng.gen_range(1..=5usize);
            let mut attendees = Vec::with_capacity(attendee_count);
            for _ in 0..attendee_count {
                let user = &company.users[rng.gen_range(0..company.users.len())];
                if user != organizer && !attendees.contains(user) {
                    attendees.push(user.clone());
                }
            }
            if attendees.is_empty() {
                continue;
            }
            records.push(MeetingRecord {
                meeting_id: format!("MTG-{}-{:04}", date.format("%Y%m%d"), records.len() + 1),
                organizer: organizer.clone(),
                attendees,
                subject: SUBJECTS[rng.gen_range(0..SUBJECTS.len())].to_string(),
                starts_at: date
                    .and_hms_opt(hour, if rng.gen_bool(0.5) { 0 } else { 30 }, 0)
                    .expect("valid hour")
                    .and_utc(),
                duration_minutes: *[30u32, 30, 60, 25].get(rng.gen_range(0..4)).unwrap_or(&30),
            });
        }
    }
    records.sort_by_key(|r| r.starts_at);

    ctx.store.publish("meetings", &records)?;

    let lines: Vec<String> = records
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<_, _>>()
        .map_err(|e| GeneratorError::Other(format!("meeting serialization: {e}")))?;
    let (path, events) = ctx.layout.write_lines(CATEGORY, "meetings.jsonl", &lines)?;
    Ok(GeneratorReport::single(path, events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::test_support;

    #[test]
    fn test_publishes_meetings_within_office_hours() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_support::context(dir.path(), 2, 0.5, &[]);
        run(&ctx).unwrap();

        let records: Vec<MeetingRecord> = ctx.store.read("meetings").unwrap();
        assert!(!records.is_empty());
        for meeting in &records {
            let hour = meeting.starts_at.format("%H").to_string().parse::<u32>().unwrap();
            assert!((8..18).contains(&hour), "meeting at {hour}");
            assert!(!meeting.attendees.contains(&meeting.organizer));
        }
    }
}
