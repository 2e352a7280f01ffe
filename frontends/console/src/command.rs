//! Console command language

use chrono::{NaiveDate, NaiveTime};
use servis::RecordKind;

pub const HELP: &str = "\
Commands:
  show [customers|vehicles|services]      print tables (all when omitted)
  search [text]                           filter customers; no text shows all
  select <kind> <row>|none                select a row by its # number
  add customer|vehicle                    open the entry form
  delete <kind>                           delete the selected row
  edit <kind> <row> <column> <text>       edit one cell; column by its # number
  service                                 show the service form
  service details|mileage|price <text>    fill the service form
  service date <dd.mm.yyyy.>              also accepts yyyy-mm-dd
  service time <hh:mm>
  service add|update|clear
  font <size>                             change the font size
  help
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    /// `None` shows every table
    Show(Option<RecordKind>),
    Search(String),
    Select { kind: RecordKind, row: Option<usize> },
    Add(RecordKind),
    Delete(RecordKind),
    Edit {
        kind: RecordKind,
        row: usize,
        column: usize,
        text: String,
    },
    Service(ServiceCommand),
    Font(u32),
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCommand {
    Show,
    Details(String),
    Mileage(String),
    Price(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Add,
    Update,
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command {0:?}, type `help` for the list")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Unknown table {0:?}, expected customers, vehicles or services")]
    UnknownKind(String),
    #[error("Expected a number, got {0:?}")]
    InvalidNumber(String),
    #[error("Invalid date {0:?}")]
    InvalidDate(String),
    #[error("Invalid time {0:?}")]
    InvalidTime(String),
}

fn parse_kind(word: &str) -> Result<RecordKind, CommandError> {
    match word.to_lowercase().as_str() {
        "customers" | "customer" | "korisnici" | "k" => Ok(RecordKind::Customers),
        "vehicles" | "vehicle" | "vozila" | "v" => Ok(RecordKind::Vehicles),
        "services" | "service" | "servisi" | "s" => Ok(RecordKind::Services),
        _ => Err(CommandError::UnknownKind(word.to_string())),
    }
}

fn parse_number<T: std::str::FromStr>(word: &str) -> Result<T, CommandError> {
    word.parse()
        .map_err(|_| CommandError::InvalidNumber(word.to_string()))
}

fn parse_date(text: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(text, "%d.%m.%Y.")
        .or_else(|_| NaiveDate::parse_from_str(text, "%d.%m.%Y"))
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
        .map_err(|_| CommandError::InvalidDate(text.to_string()))
}

fn parse_time(text: &str) -> Result<NaiveTime, CommandError> {
    NaiveTime::parse_from_str(text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .map_err(|_| CommandError::InvalidTime(text.to_string()))
}

/// Split off the first whitespace-separated word
fn next_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(end) => (&input[..end], input[end..].trim_start()),
        None => (input, ""),
    }
}

impl Command {
    /// Parse one input line; `Ok(None)` for a blank line
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let (verb, rest) = next_word(line);
        let command = match verb.to_lowercase().as_str() {
            "" => return Ok(None),
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "show" | "ls" => match next_word(rest).0 {
                "" | "all" => Command::Show(None),
                kind => Command::Show(Some(parse_kind(kind)?)),
            },
            "search" | "filter" => Command::Search(rest.trim_end().to_string()),
            "select" => {
                let (kind, rest) = next_word(rest);
                let (row, _) = next_word(rest);
                if kind.is_empty() || row.is_empty() {
                    return Err(CommandError::Usage("select <kind> <row>|none"));
                }
                let row = match row {
                    "none" | "-" => None,
                    row => Some(parse_number(row)?),
                };
                Command::Select {
                    kind: parse_kind(kind)?,
                    row,
                }
            }
            "add" => match next_word(rest).0 {
                "" => return Err(CommandError::Usage("add customer|vehicle")),
                kind => Command::Add(parse_kind(kind)?),
            },
            "delete" | "rm" => match next_word(rest).0 {
                "" => return Err(CommandError::Usage("delete <kind>")),
                kind => Command::Delete(parse_kind(kind)?),
            },
            "edit" => {
                const USAGE: &str = "edit <kind> <row> <column> <text>";
                let (kind, rest) = next_word(rest);
                let (row, rest) = next_word(rest);
                let (column, text) = next_word(rest);
                if kind.is_empty() || row.is_empty() || column.is_empty() {
                    return Err(CommandError::Usage(USAGE));
                }
                Command::Edit {
                    kind: parse_kind(kind)?,
                    row: parse_number(row)?,
                    column: parse_number(column)?,
                    text: text.trim_end().to_string(),
                }
            }
            "service" => {
                let (field, value) = next_word(rest);
                let value = value.trim_end();
                Command::Service(match field.to_lowercase().as_str() {
                    "" => ServiceCommand::Show,
                    "details" => ServiceCommand::Details(value.to_string()),
                    "mileage" => ServiceCommand::Mileage(value.to_string()),
                    "price" => ServiceCommand::Price(value.to_string()),
                    "date" => ServiceCommand::Date(parse_date(value)?),
                    "time" => ServiceCommand::Time(parse_time(value)?),
                    "add" => ServiceCommand::Add,
                    "update" => ServiceCommand::Update,
                    "clear" => ServiceCommand::Clear,
                    _ => {
                        return Err(CommandError::Usage(
                            "service [details|mileage|price|date|time <value>|add|update|clear]",
                        ));
                    }
                })
            }
            "font" => match next_word(rest).0 {
                "" => return Err(CommandError::Usage("font <size>")),
                size => Command::Font(parse_number(size)?),
            },
            _ => return Err(CommandError::Unknown(verb.to_string())),
        };
        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse(line: &str) -> Command {
        Command::parse(line).unwrap().unwrap()
    }

    #[test]
    fn parses_table_commands() {
        assert_eq!(parse("show"), Command::Show(None));
        assert_eq!(parse("show vozila"), Command::Show(Some(RecordKind::Vehicles)));
        assert_eq!(
            parse("select customers 2"),
            Command::Select {
                kind: RecordKind::Customers,
                row: Some(2)
            }
        );
        assert_eq!(
            parse("select v none"),
            Command::Select {
                kind: RecordKind::Vehicles,
                row: None
            }
        );
        assert_eq!(parse("delete servisi"), Command::Delete(RecordKind::Services));
        assert_eq!(parse("add vehicle"), Command::Add(RecordKind::Vehicles));
    }

    #[test]
    fn edit_keeps_the_rest_of_the_line_as_text() {
        assert_eq!(
            parse("edit k 0 2 Petrović Jr. "),
            Command::Edit {
                kind: RecordKind::Customers,
                row: 0,
                column: 2,
                text: "Petrović Jr.".into()
            }
        );
        assert_eq!(
            Command::parse("edit k 0"),
            Err(CommandError::Usage("edit <kind> <row> <column> <text>"))
        );
    }

    #[test]
    fn search_without_text_clears_the_filter() {
        assert_eq!(parse("search Mark"), Command::Search("Mark".into()));
        assert_eq!(parse("search"), Command::Search(String::new()));
    }

    #[test]
    fn service_date_and_time_accept_display_and_stored_layouts() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 17).unwrap();
        assert_eq!(parse("service date 17.05.2024."), Command::Service(ServiceCommand::Date(date)));
        assert_eq!(parse("service date 2024-05-17"), Command::Service(ServiceCommand::Date(date)));
        assert_eq!(
            parse("service time 14:30"),
            Command::Service(ServiceCommand::Time(NaiveTime::from_hms_opt(14, 30, 0).unwrap()))
        );
        assert_eq!(
            Command::parse("service date sutra"),
            Err(CommandError::InvalidDate("sutra".into()))
        );
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(Command::parse("   "), Ok(None));
        assert_eq!(
            Command::parse("launch"),
            Err(CommandError::Unknown("launch".into()))
        );
        assert_eq!(
            Command::parse("show trucks"),
            Err(CommandError::UnknownKind("trucks".into()))
        );
    }

    proptest! {
        #[test]
        fn parsing_never_panics(line in "\\PC{0,40}") {
            let _ = Command::parse(&line);
        }
    }
}
