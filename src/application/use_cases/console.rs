use crate::application::services::shopware_console::ShopwareConsole;
use crate::common::SwagResult;
use crate::domain::value_objects::ForwardedArgs;

/// Which binary receives the forwarded arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassthroughTarget {
    /// Shopware's `bin/console`
    Console,
    /// The bundled `sw.phar`
    Tools,
}

/// Forwards raw arguments to the Shopware console or `sw.phar`
pub struct PassthroughUseCase {
    console: ShopwareConsole,
}

impl PassthroughUseCase {
    pub fn new(console: ShopwareConsole) -> Self {
        Self { console }
    }

    /// Run the command and return its output
    pub async fn execute<S: AsRef<str>>(
        &self,
        target: PassthroughTarget,
        args: &[S],
    ) -> SwagResult<String> {
        let forwarded = ForwardedArgs::parse(args);
        tracing::debug!(?target, input = ?forwarded.input, "forwarding arguments");

        match target {
            PassthroughTarget::Console => {
                self.console
                    .console(&forwarded.input, &forwarded.flags)
                    .await
            }
            PassthroughTarget::Tools => self.console.phar(&forwarded.input, &forwarded.flags).await,
        }
    }
}
