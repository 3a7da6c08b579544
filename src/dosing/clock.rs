use chrono::{NaiveDateTime, NaiveTime};
use crate::error::{CaffeineError, CaffeineResult};

const SECONDS_PER_DAY: i64 = 24 * 3600;

/// Parses a 12-hour clock label such as `8AM`, `12PM` or `9:45pm`.
pub fn parse_clock_label(label: &str) -> CaffeineResult<NaiveTime> {
    let upper = label.trim().to_ascii_uppercase();

    let (clock, pm) = if let Some(rest) = upper.strip_suffix("AM") {
        (rest, false)
    } else if let Some(rest) = upper.strip_suffix("PM") {
        (rest, true)
    } else {
        return Err(CaffeineError::time_label(label, "expected an AM or PM marker"));
    };

    let (hour_part, minute_part) = match clock.split_once(':') {
        Some((hour, minute)) => (hour, Some(minute)),
        None => (clock, None),
    };

    let hour = parse_digits(hour_part, 1, 2)
        .ok_or_else(|| CaffeineError::time_label(label, "hour must be a number"))?;
    if !(1..=12).contains(&hour) {
        return Err(CaffeineError::time_label(label, format!("hour {} is not between 1 and 12", hour)));
    }

    let minute = match minute_part {
        Some(part) => parse_digits(part, 2, 2)
            .ok_or_else(|| CaffeineError::time_label(label, "minutes must be two digits"))?,
        None => 0,
    };
    if minute > 59 {
        return Err(CaffeineError::time_label(label, format!("minute {} is out of range", minute)));
    }

    // 12AM is midnight, 12PM is noon
    let hour24 = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };

    NaiveTime::from_hms_opt(hour24, minute, 0)
        .ok_or_else(|| CaffeineError::time_label(label, "not a valid time of day"))
}

fn parse_digits(text: &str, min_len: usize, max_len: usize) -> Option<u32> {
    if text.len() < min_len || text.len() > max_len || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Hours from `reference` to the time of day named by `label`. A label earlier
/// than the reference is taken to be on the following day.
pub fn hours_since(label: &str, reference: NaiveTime) -> CaffeineResult<f64> {
    let time = parse_clock_label(label)?;

    let mut seconds = (time - reference).num_seconds();
    if time < reference {
        seconds += SECONDS_PER_DAY;
    }

    Ok(seconds as f64 / 3600.0)
}

pub fn hours_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_seconds() as f64 / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!(parse_clock_label("8AM").unwrap(), at(8, 0));
        assert_eq!(parse_clock_label("08AM").unwrap(), at(8, 0));
        assert_eq!(parse_clock_label("2PM").unwrap(), at(14, 0));
        assert_eq!(parse_clock_label("12AM").unwrap(), at(0, 0));
        assert_eq!(parse_clock_label("12PM").unwrap(), at(12, 0));
        assert_eq!(parse_clock_label(" 9:45pm ").unwrap(), at(21, 45));
    }

    #[test]
    fn test_parse_rejects_malformed_labels() {
        for label in ["", "8", "AM", "13PM", "0AM", "8XM", "8 AM", "8:5AM", "8:60AM", "eightAM", "123AM"] {
            let err = parse_clock_label(label).unwrap_err();
            assert!(
                matches!(err, CaffeineError::InvalidTimeLabel { .. }),
                "label {:?} should be rejected",
                label
            );
        }
    }

    #[test]
    fn test_same_time_is_zero_hours() {
        assert_eq!(hours_since("8AM", at(8, 0)).unwrap(), 0.0);
    }

    #[test]
    fn test_earlier_label_rolls_to_next_day() {
        assert_eq!(hours_since("7AM", at(8, 0)).unwrap(), 23.0);
        assert_eq!(hours_since("1AM", at(22, 0)).unwrap(), 3.0);
    }

    #[test]
    fn test_later_label_same_day() {
        assert_eq!(hours_since("12PM", at(7, 0)).unwrap(), 5.0);
        assert_eq!(hours_since("8:30AM", at(8, 0)).unwrap(), 0.5);
    }

    #[test]
    fn test_hours_between_dates() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let next = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        assert_eq!(hours_between(day.and_time(at(8, 0)), next.and_time(at(9, 30))), 25.5);
    }
}
