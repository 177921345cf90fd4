//! Test doubles shared by the client tests.

use async_trait::async_trait;
use pressdock_types::{CommandOutput, CommandRunner, Invocation, Result};

mockall::mock! {
    pub Runner {}

    #[async_trait]
    impl CommandRunner for Runner {
        async fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;
    }
}
