use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};

use chanjo_core::{AdministeredRecord, Baby, Profile};
use chanjo_schedule::{is_locked, ResolvedDose, RuleTable};
use chrono::NaiveDate;

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const HEADER: Color = Color::Magenta;
    const INFO: Color = Color::Cyan;
    const WARNING: Color = Color::Yellow;
    const ERROR: Color = Color::Red;
    const DIM: Color = Color::DarkGrey;
    const DUE: Color = Color::Green;
}

/// Manages terminal output for the CLI.
pub struct Terminal;

impl Terminal {
    pub fn new() -> Self {
        Self
    }

    /// Print the startup banner.
    pub fn print_banner(&self, api_url: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print("chanjo"),
            ResetColor,
            Print(" - vaccination tracker\n"),
            SetForegroundColor(Colors::DIM),
            Print(format!("Backend: {}\n", api_url)),
            ResetColor,
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_info(&self, message: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::INFO),
            Print(format!("{}\n", message)),
            ResetColor,
        )?;
        Ok(())
    }

    /// Transient, non-blocking warning (the toast analog).
    pub fn print_warning(&self, message: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::WARNING),
            Print(format!("warning: {}\n", message)),
            ResetColor,
        )?;
        Ok(())
    }

    pub fn print_error(&self, message: &str) -> Result<()> {
        let mut stderr = io::stderr();
        execute!(
            stderr,
            SetForegroundColor(Colors::ERROR),
            Print(format!("error: {}\n", message)),
            ResetColor,
        )?;
        Ok(())
    }

    /// Read a line of input with a prompt.
    pub fn prompt_line(&self, prompt: &str) -> Result<String> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::INFO),
            Print(format!("{}: ", prompt)),
            ResetColor,
        )?;
        stdout.flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }

    /// Print the caregiver profile and registered babies.
    pub fn print_profile(&self, profile: &Profile) -> Result<()> {
        let mut stdout = io::stdout();
        match &profile.mother {
            Some(mother) => {
                execute!(
                    stdout,
                    SetForegroundColor(Colors::HEADER),
                    Print(format!("{}\n", mother.full_name)),
                    ResetColor,
                    SetForegroundColor(Colors::DIM),
                    Print(format!("  phone: {}\n", mother.phone_number)),
                    ResetColor,
                )?;
            }
            None => {
                execute!(
                    stdout,
                    SetForegroundColor(Colors::WARNING),
                    Print("Profile incomplete (run `chanjo init-profile`)\n"),
                    ResetColor,
                )?;
            }
        }

        if profile.babies.is_empty() {
            execute!(stdout, Print("No babies registered.\n"))?;
        } else {
            execute!(stdout, Print("Babies:\n"))?;
            for baby in &profile.babies {
                execute!(
                    stdout,
                    Print(format!(
                        "  {}  {}  born {}  ({})\n",
                        baby.id,
                        baby.name,
                        format_date_ordinal(baby.date_of_birth),
                        baby.gender
                    )),
                )?;
            }
        }
        Ok(())
    }

    /// Print the pending schedule grouped by age label, in table order.
    ///
    /// The age cell is blank when it repeats the row above, matching how
    /// the schedule is read on paper cards. Future doses show as locked.
    pub fn print_pending(
        &self,
        baby: &Baby,
        pending: &[ResolvedDose],
        table: &RuleTable,
        today: NaiveDate,
    ) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!("Pending vaccinations for {}\n", baby.name)),
            ResetColor,
        )?;

        if pending.is_empty() {
            execute!(stdout, Print("No upcoming vaccinations.\n"))?;
            return Ok(());
        }

        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!(
                "{:<14} {:<18} {:<22} {}\n",
                "Age", "Vaccine", "Due", "Markable"
            )),
            ResetColor,
        )?;

        let mut prev_age: Option<&str> = None;
        for dose in pending {
            let age_cell = if prev_age == Some(dose.age_label.as_str()) {
                ""
            } else {
                dose.age_label.as_str()
            };
            prev_age = Some(dose.age_label.as_str());

            let due = match dose.due_date {
                Some(d) => format_date_ordinal(d),
                None => "-".to_string(),
            };
            let vaccine = match &dose.note {
                Some(note) => format!("{} {}", dose.vaccine, note),
                None => dose.vaccine.clone(),
            };
            let (markable, color) = match dose.due_date {
                Some(d) if !is_locked(d, today) => ("yes", Colors::DUE),
                _ => ("locked (not due yet)", Colors::DIM),
            };

            execute!(
                stdout,
                Print(format!("{:<14} {:<18} {:<22} ", age_cell, vaccine, due)),
                SetForegroundColor(color),
                Print(format!("{}\n", markable)),
                ResetColor,
            )?;
        }

        if !table.footnotes.is_empty() {
            execute!(stdout, SetForegroundColor(Colors::DIM))?;
            for footnote in &table.footnotes {
                execute!(stdout, Print(format!("{}\n", footnote)))?;
            }
            execute!(stdout, ResetColor)?;
        }
        Ok(())
    }

    /// Print the administered history.
    pub fn print_administered(&self, baby: &Baby, records: &[AdministeredRecord]) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!("Administered vaccinations for {}\n", baby.name)),
            ResetColor,
        )?;

        if records.is_empty() {
            execute!(stdout, Print("No administered vaccinations to display.\n"))?;
            return Ok(());
        }

        execute!(
            stdout,
            SetForegroundColor(Colors::DIM),
            Print(format!(
                "{:<18} {:<22} {}\n",
                "Vaccine", "Date", "Source"
            )),
            ResetColor,
        )?;
        for record in records {
            execute!(
                stdout,
                Print(format!(
                    "{:<18} {:<22} {}\n",
                    record.vaccine,
                    format_date_ordinal(record.due_date),
                    record.source.as_str()
                )),
            )?;
        }
        Ok(())
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a date as "12th Feb 2024".
pub fn format_date_ordinal(date: NaiveDate) -> String {
    use chrono::Datelike;
    let day = date.day();
    let suffix = match day {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    };
    format!("{}{} {}", day, suffix, date.format("%b %Y"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn ordinal_suffixes() {
        assert_eq!(format_date_ordinal(date(2024, 2, 1)), "1st Feb 2024");
        assert_eq!(format_date_ordinal(date(2024, 2, 2)), "2nd Feb 2024");
        assert_eq!(format_date_ordinal(date(2024, 2, 3)), "3rd Feb 2024");
        assert_eq!(format_date_ordinal(date(2024, 2, 4)), "4th Feb 2024");
        assert_eq!(format_date_ordinal(date(2024, 2, 11)), "11th Feb 2024");
        assert_eq!(format_date_ordinal(date(2024, 2, 12)), "12th Feb 2024");
        assert_eq!(format_date_ordinal(date(2024, 2, 13)), "13th Feb 2024");
        assert_eq!(format_date_ordinal(date(2024, 2, 21)), "21st Feb 2024");
        assert_eq!(format_date_ordinal(date(2024, 2, 22)), "22nd Feb 2024");
    }
}
