use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use csv::WriterBuilder;

use crate::models::Registration;

/// CSV of one event's registrations: `RegID, Name, Email, Phone, When`.
pub fn event_registrations_csv(registrations: &[Registration]) -> Result<String> {
    let mut writer = quoted_writer();
    writer.write_record(["RegID", "Name", "Email", "Phone", "When"])?;
    for registration in registrations {
        writer.write_record([
            &registration.reg_id,
            &registration.name,
            &registration.email,
            &registration.phone,
            &registration.created,
        ])?;
    }
    finish(writer)
}

/// CSV across all events, each row prefixed with its event id.
pub fn all_registrations_csv(registrations: &[Registration]) -> Result<String> {
    let mut writer = quoted_writer();
    writer.write_record(["EventID", "RegID", "Name", "Email", "Phone", "When"])?;
    for registration in registrations {
        writer.write_record([
            &registration.event_id,
            &registration.reg_id,
            &registration.name,
            &registration.email,
            &registration.phone,
            &registration.created,
        ])?;
    }
    finish(writer)
}

pub fn write_export(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create export directory {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("write export {}", path.display()))
}

// Every value quoted, embedded quotes doubled, one record per line.
fn quoted_writer() -> csv::Writer<Vec<u8>> {
    WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(vec![])
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner().context("flush csv writer")?;
    String::from_utf8(bytes).context("csv not UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(event_id: &str, name: &str, email: &str) -> Registration {
        Registration {
            id: format!("r-{email}"),
            event_id: event_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            phone: "555-0100".to_string(),
            reg_id: "RABC123".to_string(),
            created: "2026-08-01T10:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn single_event_export_has_one_quoted_row_per_registration() {
        let rows = [
            registration("e1", "Ana", "a@x.com"),
            registration("e1", "Ben", "b@x.com"),
        ];
        let csv = event_registrations_csv(&rows).expect("render");
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], r#""RegID","Name","Email","Phone","When""#);
        assert_eq!(
            lines[1],
            r#""RABC123","Ana","a@x.com","555-0100","2026-08-01T10:00:00+00:00""#
        );
    }

    #[test]
    fn embedded_quotes_are_doubled_and_commas_stay_inside_fields() {
        let awkward = registration("e1", r#"Ana "The Organizer" Diaz, Jr."#, "a@x.com");
        let csv = event_registrations_csv(&[awkward]).expect("render");
        assert!(csv.contains(r#""Ana ""The Organizer"" Diaz, Jr.""#));
    }

    #[test]
    fn all_events_export_prefixes_the_event_id() {
        let rows = [registration("e9", "Ana", "a@x.com")];
        let csv = all_registrations_csv(&rows).expect("render");
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], r#""EventID","RegID","Name","Email","Phone","When""#);
        assert!(lines[1].starts_with(r#""e9","RABC123""#));
    }
}
