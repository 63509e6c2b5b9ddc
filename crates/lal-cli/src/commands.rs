use std::io::Write;

use anyhow::{bail, Context};
use colored::Colorize;
use lal_contract::{
    state_name, Asset, AssetContract, AssetState, CallerToken, FileLedgerStore, LedgerStore,
};
use tracing::debug;

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(&cli.config)?;
    let ledger_path = cli.ledger.clone().unwrap_or_else(|| config.ledger_path.clone());
    let store = FileLedgerStore::open(&ledger_path)
        .with_context(|| format!("opening ledger {}", ledger_path.display()))?;
    debug!(ledger = %ledger_path.display(), "ledger opened");

    let session = Session {
        contract: AssetContract::new(store),
        caller: caller_token(&cli, &config),
        format: cli.format,
    };
    if config.seed_on_open && session.contract.store().is_empty() {
        session.contract.init_ledger(session.caller()?)?;
    }

    let mut out = std::io::stdout().lock();
    session.execute(cli.command, &mut out)
}

fn caller_token(cli: &Cli, config: &CliConfig) -> Option<CallerToken> {
    if let Some(name) = &cli.as_name {
        return Some(CallerToken::for_identity(name));
    }
    cli.identity
        .clone()
        .or_else(|| config.identity.clone())
        .map(CallerToken::new)
}

/// One CLI invocation bound to an opened ledger.
pub struct Session<S> {
    pub contract: AssetContract<S>,
    pub caller: Option<CallerToken>,
    pub format: OutputFormat,
}

impl<S: LedgerStore> Session<S> {
    fn caller(&self) -> anyhow::Result<&CallerToken> {
        match &self.caller {
            Some(token) => Ok(token),
            None => bail!("no caller identity: pass --identity or --as, or set `identity` in lal.toml"),
        }
    }

    pub fn execute(&self, command: Command, out: &mut impl Write) -> anyhow::Result<()> {
        match command {
            Command::Init => {
                let assets = self.contract.init_ledger(self.caller()?)?;
                self.done(out, &format!("Seeded {} assets", assets.len()), &assets)
            }
            Command::Create(args) => {
                let asset = self.contract.create_asset(
                    self.caller()?,
                    &args.id,
                    args.start,
                    args.end,
                    args.amount,
                )?;
                self.done(out, &format!("Issued {}", asset.id().yellow()), &asset)
            }
            Command::Read(args) => {
                let asset = self.contract.read_asset(&args.id)?;
                self.show_asset(out, &asset)
            }
            Command::Delete(args) => {
                self.contract.delete_asset(&args.id)?;
                self.done(out, &format!("Deleted {}", args.id.yellow()), &args.id)
            }
            Command::Exists(args) => {
                let exists = self.contract.asset_exists(&args.id)?;
                match self.format {
                    OutputFormat::Json => write_json(
                        out,
                        &serde_json::json!({ "assetID": args.id, "exists": exists }),
                    ),
                    OutputFormat::Text => {
                        writeln!(out, "{exists}")?;
                        Ok(())
                    }
                }
            }
            Command::Transfer(args) => {
                let asset = self.contract.transfer_asset(&args.id, &args.borrower)?;
                let msg = format!(
                    "Transferred {} to {}",
                    asset.id().yellow(),
                    asset.borrower.bold()
                );
                self.done(out, &msg, &asset)
            }
            Command::List => {
                let assets = self.contract.get_all_assets()?;
                match self.format {
                    OutputFormat::Json => write_json(out, &assets),
                    OutputFormat::Text => {
                        if assets.is_empty() {
                            writeln!(out, "No assets.")?;
                        }
                        for asset in &assets {
                            writeln!(
                                out,
                                "{:<12} {:<9} {:>10}  {} → {}",
                                asset.id().yellow(),
                                colored_state(asset.state()),
                                asset.amount,
                                asset.lender,
                                or_dash(&asset.borrower)
                            )?;
                        }
                        Ok(())
                    }
                }
            }
            Command::State(args) => {
                let state = self.contract.get_state(&args.id)?;
                match self.format {
                    OutputFormat::Json => write_json(
                        out,
                        &serde_json::json!({ "assetID": args.id, "state": state }),
                    ),
                    OutputFormat::Text => {
                        writeln!(out, "{}", colored_state(state))?;
                        Ok(())
                    }
                }
            }
            Command::Transition(args) => {
                let to: AssetState = args.state.parse()?;
                let asset = self.contract.transition_asset(&args.id, to)?;
                let msg = format!("{} is now {}", asset.id().yellow(), colored_state(to));
                self.done(out, &msg, &asset)
            }
            Command::Pay(args) => {
                let asset = self.contract.record_payment(&args.id, &args.hash)?;
                let msg = format!(
                    "Recorded payment {} on {} ({} total)",
                    args.hash.blue(),
                    asset.id().yellow(),
                    asset.payment_hashes().len()
                );
                self.done(out, &msg, &asset)
            }
            Command::Addresses(args) => {
                let asset = self
                    .contract
                    .assign_addresses(&args.id, &args.borrower, &args.investor)?;
                self.done(out, &format!("Addresses set on {}", asset.id().yellow()), &asset)
            }
            Command::StateName(args) => {
                writeln!(out, "{}", state_name(args.code))?;
                Ok(())
            }
        }
    }

    /// Success line in text mode, the payload in JSON mode.
    fn done<T: serde::Serialize>(
        &self,
        out: &mut impl Write,
        message: &str,
        payload: &T,
    ) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => write_json(out, payload),
            OutputFormat::Text => {
                writeln!(out, "{} {}", "✓".green().bold(), message)?;
                Ok(())
            }
        }
    }

    fn show_asset(&self, out: &mut impl Write, asset: &Asset) -> anyhow::Result<()> {
        if self.format == OutputFormat::Json {
            return write_json(out, asset);
        }
        writeln!(out, "{}  {}", asset.id().yellow().bold(), colored_state(asset.state()))?;
        writeln!(out, "  Lender:    {}", asset.lender)?;
        writeln!(out, "  Borrower:  {}", or_dash(&asset.borrower))?;
        writeln!(out, "  Term:      {} → {}", asset.start_date, asset.end_date)?;
        writeln!(out, "  Amount:    {}", asset.amount)?;
        writeln!(
            out,
            "  Addresses: borrower {} / investor {}",
            or_dash(&asset.borrower_address).blue(),
            or_dash(&asset.investor_address).blue()
        )?;
        writeln!(out, "  Payments:  {}", asset.payment_hashes().len())?;
        for hash in asset.payment_hashes() {
            writeln!(out, "    {}", hash.dimmed())?;
        }
        Ok(())
    }
}

fn write_json<T: serde::Serialize>(out: &mut impl Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn colored_state(state: AssetState) -> colored::ColoredString {
    match state {
        AssetState::Issued => state.name().cyan(),
        AssetState::Pending => state.name().yellow(),
        AssetState::Trading => state.name().green(),
        AssetState::Redeemed => state.name().dimmed(),
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lal_contract::InMemoryLedgerStore;

    fn session(format: OutputFormat) -> Session<InMemoryLedgerStore> {
        Session {
            contract: AssetContract::new(InMemoryLedgerStore::new()),
            caller: Some(CallerToken::for_identity("lenderA")),
            format,
        }
    }

    fn run(session: &Session<InMemoryLedgerStore>, command: Command) -> anyhow::Result<String> {
        let mut out = Vec::new();
        session.execute(command, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn create(id: &str) -> Command {
        Command::Create(CreateArgs {
            id: id.into(),
            start: 20230101,
            end: 20240101,
            amount: 1000,
        })
    }

    #[test]
    fn create_then_read_text() {
        let s = session(OutputFormat::Text);
        let created = run(&s, create("loan-7")).unwrap();
        assert!(created.contains("loan-7"));

        let shown = run(&s, Command::Read(IdArgs { id: "loan-7".into() })).unwrap();
        assert!(shown.contains("lenderA"));
        assert!(shown.contains("ISSUED"));
        assert!(shown.contains("1000"));
    }

    #[test]
    fn read_json_is_stored_shape() {
        let s = session(OutputFormat::Json);
        run(&s, create("loan-7")).unwrap();
        let shown = run(&s, Command::Read(IdArgs { id: "loan-7".into() })).unwrap();
        let value: serde_json::Value = serde_json::from_str(&shown).unwrap();
        assert_eq!(value["assetID"], "loan-7");
        assert_eq!(value["lender"], "lenderA");
        assert_eq!(value["state"], "ISSUED");
    }

    #[test]
    fn create_without_identity_fails() {
        let mut s = session(OutputFormat::Text);
        s.caller = None;
        let err = run(&s, create("loan-7")).unwrap_err();
        assert!(err.to_string().contains("no caller identity"));
        assert!(!s.contract.asset_exists("loan-7").unwrap());
    }

    #[test]
    fn transfer_and_transition() {
        let s = session(OutputFormat::Text);
        run(&s, create("loan-7")).unwrap();
        run(
            &s,
            Command::Transfer(TransferArgs {
                id: "loan-7".into(),
                borrower: "borrowerB".into(),
            }),
        )
        .unwrap();
        run(
            &s,
            Command::Transition(TransitionArgs {
                id: "loan-7".into(),
                state: "trading".into(),
            }),
        )
        .unwrap();
        let state = run(&s, Command::State(IdArgs { id: "loan-7".into() })).unwrap();
        assert!(state.contains("TRADING"));
        assert_eq!(s.contract.read_asset("loan-7").unwrap().borrower, "borrowerB");
    }

    #[test]
    fn unknown_state_name_rejected() {
        let s = session(OutputFormat::Text);
        run(&s, create("loan-7")).unwrap();
        let err = run(
            &s,
            Command::Transition(TransitionArgs {
                id: "loan-7".into(),
                state: "defaulted".into(),
            }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown asset state"));
    }

    #[test]
    fn init_and_list_json() {
        let s = session(OutputFormat::Json);
        run(&s, Command::Init).unwrap();
        let listed = run(&s, Command::List).unwrap();
        let assets: Vec<Asset> = serde_json::from_str(&listed).unwrap();
        assert_eq!(assets.len(), 6);
        assert_eq!(assets[0].id(), "asset1");
    }

    #[test]
    fn list_empty_text() {
        let s = session(OutputFormat::Text);
        assert_eq!(run(&s, Command::List).unwrap(), "No assets.\n");
    }

    #[test]
    fn exists_and_delete() {
        let s = session(OutputFormat::Text);
        let id = || IdArgs { id: "loan-7".into() };
        assert_eq!(run(&s, Command::Exists(id())).unwrap(), "false\n");
        run(&s, create("loan-7")).unwrap();
        assert_eq!(run(&s, Command::Exists(id())).unwrap(), "true\n");
        run(&s, Command::Delete(id())).unwrap();
        assert!(run(&s, Command::Delete(id())).is_err());
    }

    #[test]
    fn pay_and_addresses() {
        let s = session(OutputFormat::Text);
        run(&s, create("loan-7")).unwrap();
        run(
            &s,
            Command::Addresses(AddressesArgs {
                id: "loan-7".into(),
                borrower: "addr-b".into(),
                investor: "addr-i".into(),
            }),
        )
        .unwrap();
        let paid = run(
            &s,
            Command::Pay(PayArgs {
                id: "loan-7".into(),
                hash: "0xfeed".into(),
            }),
        )
        .unwrap();
        assert!(paid.contains("1 total"));
        let asset = s.contract.read_asset("loan-7").unwrap();
        assert_eq!(asset.investor_address, "addr-i");
        assert_eq!(asset.payment_hashes(), ["0xfeed"]);
    }

    #[test]
    fn state_name_command() {
        let s = session(OutputFormat::Text);
        let name = |code| run(&s, Command::StateName(StateNameArgs { code })).unwrap();
        assert_eq!(name(2), "PENDING\n");
        assert_eq!(name(9), "UNKNOWN\n");
    }
}
