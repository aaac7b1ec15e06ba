use time::{Date, OffsetDateTime, UtcOffset};

/// Calendar date of `at`; all day arithmetic is done in UTC.
pub fn calendar_date(at: &OffsetDateTime) -> Date {
    at.to_offset(UtcOffset::UTC).date()
}

pub fn start_of_day(at: &OffsetDateTime) -> OffsetDateTime {
    calendar_date(at).midnight().assume_utc()
}

/// Whole calendar days from `from` to `to`, negative when `to` is earlier.
pub fn calendar_days_between(from: &OffsetDateTime, to: &OffsetDateTime) -> i64 {
    (calendar_date(to) - calendar_date(from)).whole_days()
}

#[cfg(test)]
mod test {
    use time::macros::datetime;

    use super::{calendar_days_between, start_of_day};

    #[test]
    fn truncates_to_calendar_days() {
        let from = datetime!(2024-03-01 23:59 UTC);
        let to = datetime!(2024-03-02 00:01 UTC);
        assert_eq!(calendar_days_between(&from, &to), 1);
        assert_eq!(calendar_days_between(&to, &from), -1);
        assert_eq!(calendar_days_between(&from, &from), 0);
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let at = datetime!(2024-03-02 01:00 +02:00);
        assert_eq!(start_of_day(&at), datetime!(2024-03-01 00:00 UTC));
    }
}
