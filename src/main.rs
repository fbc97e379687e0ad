// This file is part of the terraform-provider-azurerm project
//
// Copyright (C) ANEO, 2024-2024. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License")
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::Result;
use tf_provider::serve;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::azurerm_provider::AzurermProvider;

mod api_management;
mod azurerm_provider;
mod client;
mod ids;
mod locks;
mod media;
mod timeouts;
mod translate;
mod utils;
mod validate;

const LOG_ENV: &str = "TF_LOG_PROVIDER_AZURERM";

fn init_tracing() {
    // stdout carries the plugin handshake
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    serve("azurerm", AzurermProvider::default()).await?;
    Ok(())
}
