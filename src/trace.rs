//! Text written to the trace and diagnostic streams.

use std::io::{self, Write};

use chrono::{DateTime, Local, TimeZone};

use crate::constants::{DIAGNOSTIC_TIMESTAMP_FORMAT, INCOMPLETE_RESPONSE_MESSAGE};

/// Upper-case hex pairs separated by dashes, e.g. `0A-1B-FF`
pub fn hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join("-")
}

/// Echo one received chunk. Chunks follow each other without separator.
pub fn write_chunk<W: Write + ?Sized>(out: &mut W, chunk: &[u8]) -> io::Result<()> {
    out.write_all(hex_string(chunk).as_bytes())?;
    out.flush()
}

/// `[ 2026/10/16 9:05:03 +09:00] message`
pub fn diagnostic_line<Tz>(at: &DateTime<Tz>, message: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("{} {}", at.format(DIAGNOSTIC_TIMESTAMP_FORMAT), message)
}

/// Report a short response on the diagnostic stream
pub fn report_incomplete<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    let line = diagnostic_line(&Local::now(), INCOMPLETE_RESPONSE_MESSAGE);
    writeln!(out, "{}", line)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn hex_is_dash_separated_upper_case() {
        assert_eq!(hex_string(&[0x0a, 0x1b, 0xff]), "0A-1B-FF");
        assert_eq!(hex_string(&[0x00]), "00");
        assert_eq!(hex_string(&[]), "");
    }

    #[test]
    fn chunks_are_concatenated() {
        let mut out = Vec::new();
        write_chunk(&mut out, &[0x01, 0x02]).unwrap();
        write_chunk(&mut out, &[0x03]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "01-0203");
    }

    #[test]
    fn diagnostic_timestamp_layout() {
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        let at = tz.with_ymd_and_hms(2026, 10, 16, 9, 5, 3).unwrap();
        assert_eq!(
            diagnostic_line(&at, INCOMPLETE_RESPONSE_MESSAGE),
            "[ 2026/10/16 9:05:03 +09:00] Can not data received."
        );
    }

    #[test]
    fn incomplete_report_is_one_line() {
        let mut out = Vec::new();
        report_incomplete(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("[ "));
        assert!(text.trim_end().ends_with(INCOMPLETE_RESPONSE_MESSAGE));
    }
}
