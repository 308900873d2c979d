use std::error::Error;
use std::path::PathBuf;

use service::{ServiceState, ServiceStateSetupError};

use crate::state::{AppState, StateError};

/// Shared context handed to every operation.
///
/// Holds only the data-directory override; operations that talk to backends
/// build the service state themselves (and shut it down), so `init` and
/// `version` work without an initialized directory.
#[derive(Clone)]
pub struct OpContext {
    pub data_dir: Option<PathBuf>,
}

impl OpContext {
    pub fn new(data_dir: Option<PathBuf>) -> Self {
        Self { data_dir }
    }

    pub fn app(&self) -> Result<AppState, StateError> {
        AppState::load(self.data_dir.clone())
    }

    /// Full service state backed by the on-disk account store.
    pub async fn state(&self) -> Result<ServiceState, OpSetupError> {
        let app = self.app()?;
        Ok(ServiceState::from_config(&app.service_config()).await?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OpSetupError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("service setup failed: {0}")]
    Service(#[from] ServiceStateSetupError),
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
