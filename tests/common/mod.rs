#![allow(dead_code)]

use clipanda::Config;
use std::future::Future;
use wiremock::MockServer;

/// The client under test is blocking, so the mock server is driven from a
/// small runtime and the client is called outside of it.
pub struct Harness {
    pub rt: tokio::runtime::Runtime,
    pub server: MockServer,
}

impl Harness {
    pub fn start() -> Self {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let server = rt.block_on(MockServer::start());
        Harness { rt, server }
    }

    pub fn block_on<F: Future>(&self, f: F) -> F::Output {
        self.rt.block_on(f)
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn config(&self) -> Config {
        Config::new(&self.server.uri(), &self.server.uri()).unwrap()
    }
}
