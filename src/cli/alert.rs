//! One-shot alert command

use super::{print_price, print_session_header, report_outcome, AppContext, DirectionArg};
use crate::monitor::{AlertTarget, Direction, SessionOutcome};
use crate::shutdown;
use clap::Args;
use rust_decimal::Decimal;

#[derive(Args, Debug)]
pub struct AlertArgs {
    /// Base asset to monitor (e.g. BTC)
    #[arg(short, long)]
    pub symbol: String,

    /// Target price
    #[arg(short, long)]
    pub target: Decimal,

    /// Crossing direction; derived from the current price when omitted
    #[arg(short, long, value_enum)]
    pub direction: Option<DirectionArg>,
}

impl AlertArgs {
    pub async fn execute(&self, app: &AppContext) -> anyhow::Result<()> {
        if self.target <= Decimal::ZERO {
            anyhow::bail!("Target price must be positive, got {}", self.target);
        }

        let Some(instrument) = app.resolve_instrument(&self.symbol).await else {
            anyhow::bail!("{} is not listed on Bybit", self.symbol.to_uppercase());
        };

        let mut shutdown = shutdown::on_ctrl_c();

        let direction = match self.direction {
            Some(arg) => Direction::from(arg),
            None => {
                let fetched =
                    shutdown::or_shutdown(app.current_price(&instrument), &mut shutdown).await;
                let Some(current) = fetched else {
                    report_outcome(&SessionOutcome::Cancelled);
                    return Ok(());
                };
                Direction::toward(self.target, current?.last_price)
            }
        };

        print_session_header(&instrument, self.target, direction);

        let target = AlertTarget::new(instrument, self.target, direction);
        let outcome = app
            .monitor
            .run_observed(target, &mut shutdown, print_price)
            .await;
        report_outcome(&outcome);

        match outcome {
            SessionOutcome::DispatchFailed(_) => anyhow::bail!("Alert could not be delivered"),
            SessionOutcome::Alerted(_) | SessionOutcome::Cancelled => Ok(()),
        }
    }
}
