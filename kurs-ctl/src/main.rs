use std::path::PathBuf;

use anyhow::{anyhow, bail, ensure, Context};
use kurs_api::{ApiComment, CommentPage, Rate};
use kurs_client::{
    compute_conversion, flatten, Amount, CommentData, CommentsState, ConversionRow,
    ConverterAction, ExchangeProfile, Mode, RateTable, Side,
};
use tracing_subscriber::EnvFilter;

mod file_store;
mod rate_file;

use file_store::FileStore;
use rate_file::RateFile;

#[derive(structopt::StructOpt)]
struct Opt {
    #[structopt(flatten)]
    config: Config,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
struct Config {
    /// JSON file holding the quoted rates
    #[structopt(long, env = "KURS_RATES", default_value = "rates.json")]
    rates: PathBuf,

    /// Base currency the rates are quoted against
    #[structopt(long, env = "KURS_BASE", default_value = "USD")]
    base: String,

    /// JSON file holding the converter rows
    #[structopt(long, env = "KURS_STATE", default_value = "kurs-state.json")]
    state: PathBuf,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Run a one-off conversion
    Convert {
        from: String,
        to: String,
        amount: String,

        /// Treat `amount` as the amount to receive
        #[structopt(long)]
        find_out: bool,
    },

    /// Manage the quoted rates
    Rates {
        #[structopt(subcommand)]
        cmd: RatesCommand,
    },

    /// Manage the persisted converter rows
    Rows {
        /// Work on the find-out rows instead of the convert ones
        #[structopt(long)]
        find_out: bool,

        #[structopt(subcommand)]
        cmd: RowsCommand,
    },

    /// Print a comment thread from a JSON listing
    Comments { file: PathBuf },
}

#[derive(structopt::StructOpt)]
enum RatesCommand {
    List,
    Set { currency: String, buy: f64, sell: f64 },
    Delete { currency: String },
    Clear,
}

#[derive(structopt::StructOpt)]
enum RowsCommand {
    List,
    /// Add a row converting `from` into `to`
    Add {
        from: String,
        to: String,
        /// Initial amount to sell, or to receive with --find-out
        amount: Option<String>,
    },
    Remove {
        index: usize,
    },
    Reset {
        index: usize,
    },
    SetValue {
        index: usize,
        amount: String,
    },
    /// Change one currency of an existing row
    SetCurrency {
        index: usize,
        /// `from` or `to`
        #[structopt(parse(try_from_str = parse_side))]
        side: Side,
        currency: String,
    },
}

fn parse_side(s: &str) -> Result<Side, String> {
    match s {
        "from" => Ok(Side::From),
        "to" => Ok(Side::To),
        _ => Err(format!("expected `from` or `to`, got {s:?}")),
    }
}

fn mode(find_out: bool) -> Mode {
    match find_out {
        true => Mode::FindOut,
        false => Mode::Convert,
    }
}

fn show(a: &Amount) -> String {
    match a {
        Amount::Number(n) => n.to_string(),
        Amount::Text(s) if s.is_empty() => String::from("-"),
        Amount::Text(s) => s.clone(),
    }
}

fn print_rows(rows: &[ConversionRow]) {
    for (i, r) in rows.iter().enumerate() {
        println!(
            "{i}: {} {} -> {} {}",
            show(&r.from_value),
            r.from_currency,
            show(&r.to_value),
            r.to_currency
        );
    }
}

fn print_rates(rates: &RateTable) {
    println!("base: {}", rates.base());
    for r in rates.quoted() {
        println!("{}: buy {} sell {}", r.currency, r.buy, r.sell);
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum CommentListing {
    Page(CommentPage),
    List(Vec<ApiComment>),
}

fn print_comment(state: &CommentsState, c: &CommentData, depth: usize) {
    println!(
        "{:indent$}#{} {} (@{}): {} [{} likes, {} replies]",
        "",
        c.id.0,
        c.author_name,
        c.author_username,
        c.content,
        c.like_count,
        c.reply_count,
        indent = depth * 2
    );
    for r in state.replies(&c.id) {
        print_comment(state, r, depth + 1);
    }
}

async fn load_profile(config: &Config) -> anyhow::Result<ExchangeProfile<RateFile, FileStore>> {
    let mut profile = ExchangeProfile::new(
        RateFile::new(&config.rates),
        config.base.clone(),
        FileStore::new(&config.state),
    );
    profile
        .load_rates()
        .await
        .with_context(|| format!("loading rates from {:?}", config.rates))?;
    Ok(profile)
}

async fn run_rates(config: &Config, cmd: RatesCommand) -> anyhow::Result<()> {
    let mut profile = load_profile(config).await?;
    match cmd {
        RatesCommand::List => (),
        RatesCommand::Set {
            currency,
            buy,
            sell,
        } => profile
            .save_rate(Rate::new(currency, buy, sell))
            .await
            .context("saving rate")?,
        RatesCommand::Delete { currency } => profile
            .delete_rate(&currency)
            .await
            .context("deleting rate")?,
        RatesCommand::Clear => profile.clear_rates().await.context("clearing rates")?,
    }
    print_rates(profile.rates());
    Ok(())
}

/// Applies `cmd` and returns the resulting rows of `mode`
async fn edit_rows(
    config: &Config,
    mode: Mode,
    cmd: RowsCommand,
) -> anyhow::Result<Vec<ConversionRow>> {
    let mut profile = load_profile(config).await?;
    let codes = profile.rates().available_codes();
    let usable = |c: &str| -> anyhow::Result<()> {
        ensure!(codes.contains(c), "no usable rate for {c:?}");
        Ok(())
    };
    let converter = profile.converter_mut();
    let rows = converter.rows(mode);
    let actions = match cmd {
        RowsCommand::List => Vec::new(),
        RowsCommand::Add { from, to, amount } => {
            usable(&from)?;
            usable(&to)?;
            ensure!(from != to, "cannot convert {from:?} into itself");
            // incomplete rows are not persisted, so only fill them within a run
            let index = rows
                .iter()
                .position(|r| !r.is_complete())
                .unwrap_or(rows.len());
            let mut actions = Vec::new();
            if index == rows.len() {
                actions.push(ConverterAction::AddRow { mode });
            }
            actions.push(ConverterAction::UpdateCurrency {
                mode,
                index,
                side: Side::From,
                currency: from,
            });
            actions.push(ConverterAction::UpdateCurrency {
                mode,
                index,
                side: Side::To,
                currency: to,
            });
            if let Some(amount) = amount {
                actions.push(ConverterAction::UpdateValue {
                    mode,
                    index,
                    value: Amount::from(amount),
                });
            }
            actions
        }
        RowsCommand::Remove { index } => vec![ConverterAction::RemoveRow { mode, index }],
        RowsCommand::Reset { index } => vec![ConverterAction::ResetRow { mode, index }],
        RowsCommand::SetValue { index, amount } => vec![ConverterAction::UpdateValue {
            mode,
            index,
            value: Amount::from(amount),
        }],
        RowsCommand::SetCurrency {
            index,
            side,
            currency,
        } => {
            usable(&currency)?;
            match rows.get(index) {
                Some(r) if r.is_complete() => (),
                _ => bail!("no complete row at index {index}, create one with `rows add`"),
            }
            vec![ConverterAction::UpdateCurrency {
                mode,
                index,
                side,
                currency,
            }]
        }
    };
    for action in actions {
        tracing::debug!(?action, "applying");
        converter.apply(action);
    }
    Ok(converter.rows(mode).to_vec())
}

async fn run_rows(config: &Config, mode: Mode, cmd: RowsCommand) -> anyhow::Result<()> {
    print_rows(&edit_rows(config, mode, cmd).await?);
    Ok(())
}

async fn run_convert(
    config: &Config,
    from: String,
    to: String,
    amount: String,
    mode: Mode,
) -> anyhow::Result<()> {
    let profile = load_profile(config).await?;
    let rates = profile.rates();
    let codes = rates.available_codes();
    for c in [&from, &to] {
        if !codes.contains(c) {
            return Err(anyhow!("no usable rate for {c:?}"));
        }
    }
    let mut row = ConversionRow::new(&from, &to);
    *row.driving_value_mut(mode) = Amount::from(amount);
    let row = compute_conversion(&row, mode, &rates.with_base());
    print_rows(&[row]);
    Ok(())
}

fn print_comments(file: PathBuf) -> anyhow::Result<()> {
    let data = std::fs::read_to_string(&file).with_context(|| format!("reading {file:?}"))?;
    let listing: CommentListing =
        serde_json::from_str(&data).with_context(|| format!("parsing {file:?}"))?;
    let nested = match listing {
        CommentListing::Page(p) => p.results,
        CommentListing::List(l) => l,
    };
    let mut state = CommentsState::new();
    state.apply_fetched_page(flatten(&nested), true);
    for c in state.top_level() {
        print_comment(&state, c, 0);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let Opt { config, cmd } = <Opt as structopt::StructOpt>::from_args();

    match cmd {
        Command::Convert {
            from,
            to,
            amount,
            find_out,
        } => run_convert(&config, from, to, amount, mode(find_out)).await,
        Command::Rates { cmd } => run_rates(&config, cmd).await,
        Command::Rows { find_out, cmd } => run_rows(&config, mode(find_out), cmd).await,
        Command::Comments { file } => print_comments(file),
    }
}
