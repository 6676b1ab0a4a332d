//! ledger-desk: headless front desk for the savings-group ledger.
//!
//! Usage:
//!   ledger-desk --db ledger.db --data-dir ./data            (print summary)
//!   ledger-desk --db ledger.db --weeks 4                    (apply 4 weekly ticks)
//!   ledger-desk --db ledger.db --ipc-mode                   (JSON lines on stdin/stdout)
//!
//! In IPC mode every command gets one JSON reply carrying a notice and the
//! full rendered state. Withdraw and reset are refused until resent with
//! `"confirmed": true`; the refusal carries the confirmation prompt.

use anyhow::Result;
use savings_core::{
    accrual::Preview,
    config::LedgerConfig,
    error::LedgerError,
    ledger::SavingsLedger,
    money,
    types::{MemberId, TierId},
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    SelectTier {
        tier: TierId,
    },
    Enroll {
        name: String,
        #[serde(default)]
        amount: Option<f64>,
    },
    WeeklyTick,
    Withdraw {
        member_id: MemberId,
        #[serde(default)]
        confirmed: bool,
    },
    Reset {
        #[serde(default)]
        confirmed: bool,
    },
    Quit,
}

#[derive(serde::Serialize, Clone, Copy, PartialEq, Debug)]
#[serde(rename_all = "snake_case")]
enum NoticeKind {
    Ok,
    Error,
    Confirm,
}

#[derive(serde::Serialize, Debug)]
struct Notice {
    kind: NoticeKind,
    message: String,
}

impl Notice {
    fn ok(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Ok, message: message.into() }
    }
    fn error(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, message: message.into() }
    }
    fn confirm(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Confirm, message: message.into() }
    }
}

#[derive(serde::Serialize)]
struct TierView {
    tier: TierId,
    amount: String,
    rate_percent: f64,
    selected: bool,
}

#[derive(serde::Serialize)]
struct MemberView {
    id: MemberId,
    name: String,
    tier: TierId,
    joined: String,
    balance: String,
    weekly_interest: String,
    weekly_payout: String,
}

#[derive(serde::Serialize)]
struct UiState {
    tiers: Vec<TierView>,
    amount: String,
    preview_interest: String,
    preview_payout: String,
    members: Vec<MemberView>,
    total_saved: String,
    member_count: usize,
    durable: bool,
}

#[derive(serde::Serialize)]
struct Reply {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    notices: Vec<Notice>,
    state: UiState,
}

/// Presentation-side form state. The ledger itself never sees it.
struct Desk {
    ledger: SavingsLedger,
    selected_tier: Option<TierId>,
}

impl Desk {
    fn new(ledger: SavingsLedger) -> Self {
        let selected_tier = ledger.tiers().first().map(|t| t.id);
        Self { ledger, selected_tier }
    }

    /// The form amount follows the selected tier and is not editable.
    fn form_amount(&self) -> f64 {
        self.selected_tier
            .and_then(|id| self.ledger.tier_of(id).ok())
            .map_or(0.0, |t| t.amount)
    }

    fn handle(&mut self, cmd: IpcCommand) -> Vec<Notice> {
        match cmd {
            IpcCommand::GetState | IpcCommand::Quit => vec![],
            IpcCommand::SelectTier { tier } => match self.ledger.tier_of(tier) {
                Ok(_) => {
                    self.selected_tier = Some(tier);
                    vec![]
                }
                Err(e) => vec![Notice::error(e.to_string())],
            },
            IpcCommand::Enroll { name, amount } => {
                let amount = amount.unwrap_or_else(|| self.form_amount());
                match self.ledger.enroll(&name, self.selected_tier, amount) {
                    Ok(_) => self.drain(),
                    Err(e) => vec![Notice::error(e.to_string())],
                }
            }
            IpcCommand::WeeklyTick => match self.ledger.apply_weekly_tick() {
                Ok(_) => self.drain(),
                Err(e @ LedgerError::EmptyOperation { .. }) => {
                    vec![Notice::error(e.to_string())]
                }
                Err(e) => vec![Notice::error(format!("Weekly progress failed: {e}"))],
            },
            IpcCommand::Withdraw { member_id, confirmed } => {
                let Some(member) = self.ledger.member(&member_id) else {
                    return vec![Notice::error(
                        LedgerError::NotFound { member_id }.to_string(),
                    )];
                };
                if !confirmed {
                    return vec![Notice::confirm(format!(
                        "Confirm withdrawal for {} (current balance {})?",
                        member.name,
                        money::format(member.balance)
                    ))];
                }
                match self.ledger.withdraw(&member_id) {
                    Ok(_) => self.drain(),
                    Err(e) => vec![Notice::error(e.to_string())],
                }
            }
            IpcCommand::Reset { confirmed } => {
                if !confirmed {
                    return vec![Notice::confirm("Reset will remove all members. Continue?")];
                }
                self.ledger.reset_all();
                self.drain()
            }
        }
    }

    fn drain(&mut self) -> Vec<Notice> {
        let mut notices: Vec<Notice> = self
            .ledger
            .drain_events()
            .iter()
            .map(|e| Notice::ok(e.message()))
            .collect();
        if !self.ledger.last_persistence().is_durable() {
            notices.push(Notice::error("Changes could not be saved; they will be lost on exit"));
        }
        notices
    }

    fn render(&self) -> UiState {
        let amount = self.form_amount();
        let Preview { interest, payout } = self.ledger.preview_for_tier(self.selected_tier, amount);
        UiState {
            tiers: self
                .ledger
                .tiers()
                .all()
                .map(|t| TierView {
                    tier: t.id,
                    amount: money::format(t.amount),
                    rate_percent: money::round(t.rate * 100.0),
                    selected: self.selected_tier == Some(t.id),
                })
                .collect(),
            amount: format!("{amount:.2}"),
            preview_interest: money::format(interest),
            preview_payout: money::format(payout),
            members: self
                .ledger
                .rows()
                .into_iter()
                .map(|r| MemberView {
                    id: r.id,
                    name: r.name,
                    tier: r.tier,
                    joined: r.joined_on.format("%Y-%m-%d").to_string(),
                    balance: money::format(r.balance),
                    weekly_interest: money::format(r.weekly_interest),
                    weekly_payout: money::format(r.weekly_payout),
                })
                .collect(),
            total_saved: money::format(self.ledger.total_balance()),
            member_count: self.ledger.count(),
            durable: self.ledger.last_persistence().is_durable(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let weeks = parse_arg(&args, "--weeks", 0u32);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or("ledger.db");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");

    let config = match LedgerConfig::load(data_dir) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Using built-in tiers: {e}");
            LedgerConfig::default_test()
        }
    };

    if !ipc_mode {
        println!("Savings group ledger: ledger-desk");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!("  slot:      {}", config.storage_key);
        println!();
    }

    let ledger = SavingsLedger::open_sqlite(config, db)?;
    if ledger.tiers().is_empty() {
        log::warn!("No tiers configured; every enrollment will be rejected");
    }
    let mut desk = Desk::new(ledger);

    if ipc_mode {
        run_ipc_loop(&mut desk)?;
    } else {
        for week in 1..=weeks {
            match desk.ledger.apply_weekly_tick() {
                Ok(report) => println!(
                    "  week {week}: credited {} across {} members",
                    money::format(report.interest_credited),
                    report.members_updated
                ),
                Err(e) => {
                    println!("  week {week}: {e}");
                    break;
                }
            }
        }
        print_summary(&desk.ledger);
    }

    Ok(())
}

fn run_ipc_loop(desk: &mut Desk) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let quit = matches!(cmd, IpcCommand::Quit);
        let notices = desk.handle(cmd);
        let reply = Reply { notices, state: desk.render() };
        writeln!(stdout, "{}", serde_json::to_string(&reply)?)?;
        stdout.flush()?;
        if quit {
            break;
        }
    }
    Ok(())
}

fn print_summary(ledger: &SavingsLedger) {
    println!("=== LEDGER SUMMARY ===");
    match ledger.summary() {
        Ok(s) => {
            println!("  members:         {}", s.member_count);
            println!("  total saved:     {}", money::format(s.total_balance));
            println!("  weekly interest: {}", money::format(s.total_weekly_interest));
            println!("  weekly payout:   {}", money::format(s.total_weekly_payout));
        }
        Err(e) => println!("  ({e})"),
    }

    let rows = ledger.rows();
    if !rows.is_empty() {
        println!();
        println!("=== MEMBERS ===");
        for r in rows {
            println!(
                "  {} | Tier {} | {} | +{} | joined {}",
                r.name,
                r.tier,
                money::format(r.balance),
                money::format(r.weekly_interest),
                r.joined_on
            );
        }
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
