//! # Command Line Parsing
//!
//! Turns `std::env::args()` into a [`Cli`] value. Every option except the
//! global `--json` and `--help` takes exactly one value.
//!
//! ## Grammar
//! ```text
//! logi [--db PATH] [--json] <command> [options]
//!
//!   new        --fm-date D --fm-master REF --lm-date D [fields] [--pdf PATH]
//!   show       ID
//!   history    [FILTER]
//!   edit       ID [fields] [--pdf PATH]
//!   delete     ID | --master REF
//!   pdf        ID | --master REF  [--out PATH]
//!   dashboard  [FILTER]
//!   rates      show | history | set --cc X --adimex Y --admin-key K
//!
//!   FILTER  =  --month M --year Y   |   --from D --to D
//! ```

use chrono::NaiveDate;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{AppError, AppResult};
use logi_core::{
    month_label, AttachmentKey, Money, OperationInput, OperationPatch, Rates, RecordFilter,
    MONTH_LABELS,
};

/// Help text printed by `logi --help`.
pub const USAGE: &str = "\
Logi - First Mile / Last Mile operations ledger

Usage: logi [--db PATH] [--json] <COMMAND> [OPTIONS]

Commands:
  new          Record a new operation
  show ID      Show one operation
  history      List operations (history table)
  edit ID      Change fields of an operation; derived amounts are recomputed
  delete       Delete by id, or every operation with --master REF
  pdf          Save a receipt: pdf ID | pdf --master REF [--out PATH]
  dashboard    Totals, ADIMEX control, expense breakdown, per-month costs
  rates        rates show | rates history | rates set --cc X --adimex Y --admin-key K

Operation fields (new / edit):
  --month LABEL        Reporting month (default: month of --lm-date)
  --fm-date DATE       First-mile pre-alert date (YYYY-MM-DD)
  --fm-master REF      First-mile master reference
  --lm-date DATE       Last-mile pre-alert date (YYYY-MM-DD)
  --lm-master REF      Last-mile master reference
  --boxes N  --packages N  --weight KG  --crew N
  --crew-cost X  --forklift X  --yale X  --extra X  --subcontract X
  --freight-type TEXT  --truck-type TEXT  --adimex-paid X
  --pdf PATH           Attach a receipt PDF

Filters (history / dashboard):
  --month M --year Y   One month (number or label) of one year
  --from DATE --to DATE  Inclusive range on the last-mile date

Global options:
  --db PATH    Database file (default: LOGI_DB_PATH or the platform data dir)
  --json       Print JSON instead of text
  -h, --help   Show this help message";

// =============================================================================
// Parsed Command Line
// =============================================================================

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Cli {
    pub db_path: Option<PathBuf>,
    pub json: bool,
    pub command: Command,
}

/// One console command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    New {
        input: OperationInput,
        pdf: Option<PathBuf>,
    },
    Show {
        id: i64,
    },
    History {
        filter: RecordFilter,
    },
    Edit {
        id: i64,
        patch: OperationPatch,
        pdf: Option<PathBuf>,
    },
    Delete(DeleteTarget),
    Pdf {
        key: AttachmentKey,
        out: Option<PathBuf>,
    },
    Dashboard {
        filter: RecordFilter,
    },
    Rates(RatesCommand),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Id(i64),
    Master(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RatesCommand {
    Show,
    History,
    Set { rates: Rates, admin_key: String },
}

// =============================================================================
// Entry Point
// =============================================================================

/// Parses the arguments after the program name.
pub fn parse(args: &[String]) -> AppResult<Cli> {
    let mut db_path = None;
    let mut json = false;
    let mut help = false;
    let mut rest = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--db" => {
                let value = iter.next().ok_or_else(|| missing_value("db"))?;
                db_path = Some(PathBuf::from(value));
            }
            "--json" => json = true,
            "--help" | "-h" => help = true,
            _ => rest.push(arg.clone()),
        }
    }

    let command = match rest.split_first() {
        _ if help => Command::Help,
        None => Command::Help,
        Some((name, tail)) => parse_command(name, tail)?,
    };

    Ok(Cli {
        db_path,
        json,
        command,
    })
}

fn parse_command(name: &str, tail: &[String]) -> AppResult<Command> {
    if name == "rates" {
        return parse_rates(tail);
    }

    let mut flags = Flags::parse(tail)?;

    let command = match name {
        "help" => Command::Help,
        "new" => {
            let (input, pdf) = take_new(&mut flags)?;
            Command::New { input, pdf }
        }
        "show" => Command::Show {
            id: required(flags.take_id()?, "operation id")?,
        },
        "history" => Command::History {
            filter: take_filter(&mut flags)?,
        },
        "edit" => Command::Edit {
            id: required(flags.take_id()?, "operation id")?,
            patch: take_patch(&mut flags)?,
            pdf: flags.take("pdf").map(PathBuf::from),
        },
        "delete" => Command::Delete(match flags.take("master") {
            Some(master) => DeleteTarget::Master(master),
            None => DeleteTarget::Id(required(flags.take_id()?, "operation id or --master")?),
        }),
        "pdf" => {
            let key = match flags.take("master") {
                Some(master) => AttachmentKey::MasterRef(master),
                None => AttachmentKey::Id(required(flags.take_id()?, "operation id or --master")?),
            };
            Command::Pdf {
                key,
                out: flags.take("out").map(PathBuf::from),
            }
        }
        "dashboard" => Command::Dashboard {
            filter: take_filter(&mut flags)?,
        },
        other => return Err(AppError::usage(format!("unknown command '{}'", other))),
    };

    flags.finish()?;
    Ok(command)
}

fn parse_rates(tail: &[String]) -> AppResult<Command> {
    let (sub, rest) = match tail.split_first() {
        Some((sub, rest)) => (sub.as_str(), rest),
        None => ("show", tail),
    };

    let mut flags = Flags::parse(rest)?;

    let command = match sub {
        "show" => RatesCommand::Show,
        "history" => RatesCommand::History,
        "set" => {
            let cc_rate = required(flags.take_parsed::<f64>("cc")?, "--cc")?;
            let adimex_rate = required(flags.take_parsed::<f64>("adimex")?, "--adimex")?;
            let admin_key = required(flags.take("admin-key"), "--admin-key")?;
            RatesCommand::Set {
                rates: Rates::new(cc_rate, adimex_rate),
                admin_key,
            }
        }
        other => {
            return Err(AppError::usage(format!(
                "unknown rates command '{}' (expected show, history or set)",
                other
            )))
        }
    };

    flags.finish()?;
    Ok(Command::Rates(command))
}

// =============================================================================
// Option Groups
// =============================================================================

fn take_new(flags: &mut Flags) -> AppResult<(OperationInput, Option<PathBuf>)> {
    let last_mile_date = required(flags.take_parsed::<NaiveDate>("lm-date")?, "--lm-date")?;

    let input = OperationInput {
        month: flags
            .take("month")
            .unwrap_or_else(|| month_label(last_mile_date).to_string()),
        first_mile_date: required(flags.take_parsed("fm-date")?, "--fm-date")?,
        first_mile_master: required(flags.take("fm-master"), "--fm-master")?,
        last_mile_date,
        last_mile_master: flags.take("lm-master").unwrap_or_default(),
        boxes: flags.take_parsed("boxes")?.unwrap_or(0),
        packages: flags.take_parsed("packages")?.unwrap_or(0),
        weight_kg: flags.take_parsed("weight")?.unwrap_or(0.0),
        crew_size: flags.take_parsed("crew")?.unwrap_or(0),
        crew_cost: flags.take_money("crew-cost")?.unwrap_or_default(),
        forklift_cost: flags.take_money("forklift")?.unwrap_or_default(),
        yale_cost: flags.take_money("yale")?.unwrap_or_default(),
        extraordinary_cost: flags.take_money("extra")?.unwrap_or_default(),
        freight_type: flags.take("freight-type").unwrap_or_default(),
        truck_type: flags.take("truck-type").unwrap_or_default(),
        subcontract_freight_cost: flags.take_money("subcontract")?.unwrap_or_default(),
        adimex_paid: flags.take_money("adimex-paid")?.unwrap_or_default(),
    };

    let pdf = flags.take("pdf").map(PathBuf::from);
    Ok((input, pdf))
}

/// Builds a patch from the same options `new` accepts. The receipt is
/// attached later, once the file has been read.
fn take_patch(flags: &mut Flags) -> AppResult<OperationPatch> {
    Ok(OperationPatch {
        month: flags.take("month"),
        first_mile_date: flags.take_parsed("fm-date")?,
        first_mile_master: flags.take("fm-master"),
        last_mile_date: flags.take_parsed("lm-date")?,
        last_mile_master: flags.take("lm-master"),
        boxes: flags.take_parsed("boxes")?,
        packages: flags.take_parsed("packages")?,
        weight_kg: flags.take_parsed("weight")?,
        crew_size: flags.take_parsed("crew")?,
        crew_cost: flags.take_money("crew-cost")?,
        forklift_cost: flags.take_money("forklift")?,
        yale_cost: flags.take_money("yale")?,
        extraordinary_cost: flags.take_money("extra")?,
        freight_type: flags.take("freight-type"),
        truck_type: flags.take("truck-type"),
        subcontract_freight_cost: flags.take_money("subcontract")?,
        adimex_paid: flags.take_money("adimex-paid")?,
        attachment: None,
    })
}

fn take_filter(flags: &mut Flags) -> AppResult<RecordFilter> {
    let month = flags.take("month");
    let year = flags.take_parsed::<i32>("year")?;
    let from = flags.take_parsed::<NaiveDate>("from")?;
    let to = flags.take_parsed::<NaiveDate>("to")?;

    match (month, year, from, to) {
        (None, None, None, None) => Ok(RecordFilter::All),
        (Some(month), Some(year), None, None) => Ok(RecordFilter::MonthYear {
            month: parse_month(&month)?,
            year,
        }),
        (None, None, Some(from), Some(to)) => Ok(RecordFilter::DateRange { from, to }),
        _ => Err(AppError::usage(
            "filter takes either --month with --year, or --from with --to",
        )),
    }
}

/// Accepts `3`, `03` or a month label such as `marzo`.
fn parse_month(raw: &str) -> AppResult<u32> {
    let raw = raw.trim();
    if let Ok(number) = raw.parse::<u32>() {
        return Ok(number);
    }
    MONTH_LABELS
        .iter()
        .position(|label| label.eq_ignore_ascii_case(raw))
        .map(|index| index as u32 + 1)
        .ok_or_else(|| invalid_value("month", raw))
}

// =============================================================================
// Flag Bag
// =============================================================================

/// `--name value` pairs and bare positionals of one subcommand.
#[derive(Debug, Default)]
struct Flags {
    values: Vec<(String, String)>,
    positionals: Vec<String>,
}

impl Flags {
    fn parse(args: &[String]) -> AppResult<Self> {
        let mut flags = Flags::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            match arg.strip_prefix("--") {
                Some(name) => {
                    let value = iter.next().ok_or_else(|| missing_value(name))?;
                    flags.values.push((name.to_string(), value.clone()));
                }
                None => flags.positionals.push(arg.clone()),
            }
        }

        Ok(flags)
    }

    /// Removes and returns the value of `--name`.
    fn take(&mut self, name: &str) -> Option<String> {
        let index = self.values.iter().position(|(n, _)| n == name)?;
        Some(self.values.remove(index).1)
    }

    fn take_parsed<T: FromStr>(&mut self, name: &str) -> AppResult<Option<T>> {
        match self.take(name) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| invalid_value(name, &raw)),
        }
    }

    fn take_money(&mut self, name: &str) -> AppResult<Option<Money>> {
        Ok(self.take_parsed::<f64>(name)?.map(Money::new))
    }

    /// Removes the first positional and parses it as an operation id.
    fn take_id(&mut self) -> AppResult<Option<i64>> {
        if self.positionals.is_empty() {
            return Ok(None);
        }
        let raw = self.positionals.remove(0);
        raw.parse::<i64>()
            .map(Some)
            .map_err(|_| invalid_value("operation id", &raw))
    }

    /// Fails on anything no option group consumed.
    fn finish(self) -> AppResult<()> {
        if let Some((name, _)) = self.values.first() {
            return Err(AppError::usage(format!("unknown option --{}", name)));
        }
        if let Some(arg) = self.positionals.first() {
            return Err(AppError::usage(format!("unexpected argument '{}'", arg)));
        }
        Ok(())
    }
}

fn required<T>(value: Option<T>, what: &str) -> AppResult<T> {
    value.ok_or_else(|| AppError::usage(format!("{} is required", what)))
}

fn missing_value(name: &str) -> AppError {
    AppError::usage(format!("--{} requires a value", name))
}

fn invalid_value(name: &str, raw: &str) -> AppError {
    AppError::usage(format!("invalid value for {}: '{}'", name, raw))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    fn command(line: &str) -> Command {
        parse(&args(line)).unwrap().command
    }

    fn usage_error(line: &str) -> bool {
        matches!(parse(&args(line)), Err(e) if e.code == ErrorCode::Usage)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_no_arguments_is_help() {
        assert_eq!(command(""), Command::Help);
        assert_eq!(command("history --help"), Command::Help);
    }

    #[test]
    fn test_global_flags_anywhere() {
        let cli = parse(&args("show 7 --json --db /tmp/x.db")).unwrap();
        assert!(cli.json);
        assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/x.db")));
        assert_eq!(cli.command, Command::Show { id: 7 });
    }

    #[test]
    fn test_new_with_all_fields() {
        let line = "new --fm-date 2026-03-01 --fm-master FM-1 --lm-date 2026-03-05 \
                    --lm-master LM-1 --boxes 4 --packages 100 --weight 50 --crew 3 \
                    --crew-cost 200 --forklift 50 --yale 30 --extra 0 --subcontract 20 \
                    --freight-type Nacional --truck-type Torton --adimex-paid 15 \
                    --pdf receipt.pdf";

        let Command::New { input, pdf } = command(line) else {
            panic!("expected new");
        };

        assert_eq!(input.month, "Marzo");
        assert_eq!(input.first_mile_date, date(2026, 3, 1));
        assert_eq!(input.last_mile_date, date(2026, 3, 5));
        assert_eq!(input.packages, 100);
        assert_eq!(input.weight_kg, 50.0);
        assert_eq!(input.crew_cost, Money::new(200.0));
        assert_eq!(input.subcontract_freight_cost, Money::new(20.0));
        assert_eq!(input.adimex_paid, Money::new(15.0));
        assert_eq!(input.truck_type, "Torton");
        assert_eq!(pdf, Some(PathBuf::from("receipt.pdf")));
    }

    #[test]
    fn test_new_defaults_and_explicit_month() {
        let Command::New { input, pdf } =
            command("new --fm-date 2026-01-30 --fm-master FM-2 --lm-date 2026-02-02 --month Enero")
        else {
            panic!("expected new");
        };

        assert_eq!(input.month, "Enero");
        assert_eq!(input.packages, 0);
        assert!(input.crew_cost.is_zero());
        assert!(input.last_mile_master.is_empty());
        assert!(pdf.is_none());
    }

    #[test]
    fn test_new_requires_keys() {
        assert!(usage_error("new --fm-master FM-1 --lm-date 2026-03-05"));
        assert!(usage_error("new --fm-date 2026-03-01 --lm-date 2026-03-05"));
        assert!(usage_error("new --fm-date 2026-03-01 --fm-master FM-1"));
    }

    #[test]
    fn test_bad_values_are_usage_errors() {
        assert!(usage_error(
            "new --fm-date 2026-13-01 --fm-master FM-1 --lm-date 2026-03-05"
        ));
        assert!(usage_error("edit 3 --packages many"));
        assert!(usage_error("show abc"));
        assert!(usage_error("show 1 --colour red"));
        assert!(usage_error("show 1 2"));
        assert!(usage_error("edit 3 --boxes"));
        assert!(usage_error("frobnicate"));
    }

    #[test]
    fn test_edit_patch() {
        let Command::Edit { id, patch, pdf } =
            command("edit 12 --packages 200 --truck-type Rabon --pdf new.pdf")
        else {
            panic!("expected edit");
        };

        assert_eq!(id, 12);
        assert_eq!(patch.packages, Some(200));
        assert_eq!(patch.truck_type.as_deref(), Some("Rabon"));
        assert_eq!(patch.boxes, None);
        assert!(patch.attachment.is_none());
        assert_eq!(pdf, Some(PathBuf::from("new.pdf")));
    }

    #[test]
    fn test_filters() {
        assert_eq!(
            command("history"),
            Command::History {
                filter: RecordFilter::All
            }
        );
        assert_eq!(
            command("dashboard --month 3 --year 2026"),
            Command::Dashboard {
                filter: RecordFilter::MonthYear {
                    month: 3,
                    year: 2026
                }
            }
        );
        assert_eq!(
            command("dashboard --month marzo --year 2026"),
            command("dashboard --month 3 --year 2026")
        );
        assert_eq!(
            command("history --from 2026-01-01 --to 2026-01-31"),
            Command::History {
                filter: RecordFilter::DateRange {
                    from: date(2026, 1, 1),
                    to: date(2026, 1, 31)
                }
            }
        );
        assert!(usage_error("history --month 3"));
        assert!(usage_error("history --month 3 --year 2026 --from 2026-01-01"));
        assert!(usage_error("dashboard --month Smarch --year 2026"));
    }

    #[test]
    fn test_delete_and_pdf_targets() {
        assert_eq!(command("delete 5"), Command::Delete(DeleteTarget::Id(5)));
        assert_eq!(
            command("delete --master FM-9"),
            Command::Delete(DeleteTarget::Master("FM-9".to_string()))
        );
        assert!(usage_error("delete"));
        assert!(usage_error("delete 5 --master FM-9"));

        assert_eq!(
            command("pdf --master FM-9 --out r.pdf"),
            Command::Pdf {
                key: AttachmentKey::MasterRef("FM-9".to_string()),
                out: Some(PathBuf::from("r.pdf")),
            }
        );
        assert_eq!(
            command("pdf 4"),
            Command::Pdf {
                key: AttachmentKey::Id(4),
                out: None,
            }
        );
    }

    #[test]
    fn test_rates_commands() {
        assert_eq!(command("rates"), Command::Rates(RatesCommand::Show));
        assert_eq!(command("rates history"), Command::Rates(RatesCommand::History));
        assert_eq!(
            command("rates set --cc 1.0 --adimex 0.4 --admin-key s3cret"),
            Command::Rates(RatesCommand::Set {
                rates: Rates::new(1.0, 0.4),
                admin_key: "s3cret".to_string(),
            })
        );
        assert!(usage_error("rates set --cc 1.0 --adimex 0.4"));
        assert!(usage_error("rates drop"));
    }
}
