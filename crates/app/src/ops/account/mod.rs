use clap::{Args, Subcommand};

pub mod add;
pub mod list;
pub mod remove;

use crate::op::Op;
use add::AccountAdd;
use list::AccountList;
use remove::AccountRemove;

crate::command_enum! {
    (Add, AccountAdd),
    (List, AccountList),
    (Remove, AccountRemove),
}

pub type AccountCommand = Command;

/// Manage configured backend accounts.
#[derive(Args, Debug, Clone)]
pub struct Account {
    #[command(subcommand)]
    pub command: AccountCommand,
}

#[async_trait::async_trait]
impl Op for Account {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
