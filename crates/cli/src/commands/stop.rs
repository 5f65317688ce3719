// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! `lf stop [service]` — stops one named service, or everything `lfd` owns
//! if none is given (§6).

use crate::client::Client;
use crate::exit_error::ExitError;

pub async fn handle(client: &Client, service: Option<String>) -> Result<(), ExitError> {
    let services = service.into_iter().collect::<Vec<_>>();
    match client.services_stop(services).await {
        Ok(entries) => {
            for entry in entries {
                println!("{}: {}", entry.service_id, entry.state);
            }
            Ok(())
        }
        Err(_) => {
            println!("lfd is not running");
            Ok(())
        }
    }
}
