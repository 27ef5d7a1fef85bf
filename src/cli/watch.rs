//! Interactive watch command

use super::input::{parse_target, StdinLines};
use super::{now, print_price, print_session_header, report_outcome, AppContext};
use crate::feed::Instrument;
use crate::monitor::{AlertTarget, Direction, SessionOutcome};
use crate::shutdown;
use clap::Args;
use tokio::sync::watch;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Base asset to monitor (e.g. BTC); prompted for when omitted
    #[arg(short, long)]
    pub symbol: Option<String>,
}

impl WatchArgs {
    pub async fn execute(&self, app: &AppContext) -> anyhow::Result<()> {
        let mut shutdown = shutdown::on_ctrl_c();
        let mut stdin = StdinLines::spawn();

        println!("=== BYBIT PRICE ALERT ===");

        let Some(instrument) = self.select_instrument(app, &mut stdin, &mut shutdown).await else {
            println!("\n👋 Goodbye!");
            return Ok(());
        };

        loop {
            let prompt = format!(
                "\n[{}] Target price for {} (0 to exit): $",
                now(),
                instrument
            );
            let Some(line) = stdin.prompt(&prompt, &mut shutdown).await else {
                break;
            };

            let target_price = match parse_target(&line) {
                Ok(Some(price)) => price,
                Ok(None) => break,
                Err(e) => {
                    println!("\n⚠️ {}", e);
                    continue;
                }
            };

            let fetched =
                shutdown::or_shutdown(app.current_price(&instrument), &mut shutdown).await;
            let current = match fetched {
                None => break,
                Some(Ok(tick)) => tick,
                Some(Err(e)) => {
                    tracing::warn!(error = %e, %instrument, "Could not fetch current price");
                    println!("\n⚠️ Could not fetch the current price, try again");
                    continue;
                }
            };

            let direction = Direction::toward(target_price, current.last_price);
            print_session_header(&instrument, target_price, direction);

            let target = AlertTarget::new(instrument.clone(), target_price, direction);
            let outcome = app
                .monitor
                .run_observed(target, &mut shutdown, print_price)
                .await;
            report_outcome(&outcome);

            if outcome == SessionOutcome::Cancelled {
                break;
            }
        }

        println!("\n👋 Goodbye!");
        Ok(())
    }

    /// Use `--symbol` or prompt until a listed symbol is entered
    async fn select_instrument(
        &self,
        app: &AppContext,
        stdin: &mut StdinLines,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Option<Instrument> {
        if let Some(base) = &self.symbol {
            let instrument = app.resolve_instrument(base).await;
            if instrument.is_none() {
                println!("\n[{}] ❌ {} is not listed on Bybit", now(), base.to_uppercase());
            }
            return instrument;
        }

        loop {
            let line = stdin
                .prompt("Symbol to monitor (e.g. BTC): ", shutdown)
                .await?;
            if line.trim().is_empty() {
                continue;
            }

            match app.resolve_instrument(&line).await {
                Some(instrument) => return Some(instrument),
                None => println!(
                    "\n[{}] ❌ {} is not listed on Bybit, try again",
                    now(),
                    Instrument::from_base(&line, &app.config.feed.quote_asset)
                ),
            }
        }
    }
}
