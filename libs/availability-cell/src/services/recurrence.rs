use chrono::{DateTime, Days, Months, NaiveDate, Utc};

use shared_store::records::{RecurrencePolicy, Slot};

/// Dates a template window expands to: successive steps of the policy's
/// cadence, stopping strictly before `template_date + 1 month`. The horizon
/// is fixed; a monthly policy therefore yields no dates, since its first
/// step lands exactly on the horizon.
pub fn candidate_dates(template_date: NaiveDate, policy: RecurrencePolicy) -> Vec<NaiveDate> {
    let Some(horizon) = template_date.checked_add_months(Months::new(1)) else {
        return Vec::new();
    };

    let mut dates = Vec::new();
    let mut current = template_date;
    loop {
        let next = match policy {
            RecurrencePolicy::None => None,
            RecurrencePolicy::Daily => current.checked_add_days(Days::new(1)),
            RecurrencePolicy::Weekly => current.checked_add_days(Days::new(7)),
            RecurrencePolicy::Monthly => current.checked_add_months(Months::new(1)),
        };
        match next {
            Some(date) if date < horizon => {
                dates.push(date);
                current = date;
            }
            _ => return dates,
        }
    }
}

/// Shift the template's slot intervals onto a candidate date, preserving
/// time-of-day. Shifting by whole days keeps a slot ending exactly at
/// midnight inside the candidate day's span.
pub fn rebase_slots(
    template_date: NaiveDate,
    candidate_date: NaiveDate,
    slots: &[Slot],
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let shift = candidate_date.signed_duration_since(template_date);
    slots
        .iter()
        .map(|slot| (slot.start + shift, slot.end + shift))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_covers_every_day_up_to_the_horizon() {
        let dates = candidate_dates(date(2025, 10, 1), RecurrencePolicy::Daily);
        assert_eq!(dates.len(), 30);
        assert_eq!(dates.first(), Some(&date(2025, 10, 2)));
        assert_eq!(dates.last(), Some(&date(2025, 10, 31)));
    }

    #[test]
    fn weekly_steps_by_seven_days() {
        let dates = candidate_dates(date(2025, 10, 1), RecurrencePolicy::Weekly);
        assert_eq!(
            dates,
            vec![
                date(2025, 10, 8),
                date(2025, 10, 15),
                date(2025, 10, 22),
                date(2025, 10, 29),
            ]
        );
    }

    #[test]
    fn monthly_first_step_lands_on_the_horizon() {
        let dates = candidate_dates(date(2025, 10, 1), RecurrencePolicy::Monthly);
        assert!(dates.is_empty());
    }

    #[test]
    fn none_expands_to_nothing() {
        let dates = candidate_dates(date(2025, 10, 1), RecurrencePolicy::None);
        assert!(dates.is_empty());
    }

    #[test]
    fn rebase_preserves_time_of_day() {
        let template = date(2025, 10, 1);
        let start = template.and_hms_opt(9, 30, 0).unwrap().and_utc();
        let end = template.and_hms_opt(10, 15, 0).unwrap().and_utc();
        let slots = vec![Slot::new(start, end)];

        let rebased = rebase_slots(template, date(2025, 10, 14), &slots);
        assert_eq!(rebased.len(), 1);
        assert_eq!(rebased[0].0.date_naive(), date(2025, 10, 14));
        assert_eq!(rebased[0].0.hour(), 9);
        assert_eq!(rebased[0].0.minute(), 30);
        assert_eq!(rebased[0].1.hour(), 10);
        assert_eq!(rebased[0].1.minute(), 15);
    }
}
