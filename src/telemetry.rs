// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise production logs at info level as JSON,
/// any other mode logs at debug level in the human readable format.
pub fn init(production: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(production)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if production {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn default_directive(production: bool) -> &'static str {
    if production {
        "info"
    } else {
        "debug"
    }
}
