mod error;
mod routes;

use std::{error::Error, net::SocketAddr};

use axum_server::tls_rustls::RustlsConfig;
use gabinete::{
    domain::ledger::BookingLedger,
    infrastructure::{self, core::SqliteReservationRepository},
    GabineteConfig,
};
use tracing::{error, info, Level};

#[tokio::main]
async fn main() {
    match GabineteConfig::load() {
        Ok(config) => {
            tracing_subscriber::fmt()
                .with_max_level(Level::from(&config.logger.level))
                .init();
            if let Err(error) = serve(&config).await {
                error!("アプリケーションエラー: {}", error);
            }
        }
        Err(error) => {
            tracing_subscriber::fmt::init();
            error!("設定の読み込みに失敗しました: {}", error)
        }
    }
}

async fn serve(config: &GabineteConfig) -> Result<(), Box<dyn Error>> {
    let pool = infrastructure::connect(&config.database).await?;
    infrastructure::migrate(&pool).await?;
    info!("データベースに接続しました: {}", config.database.url);

    let ledger = BookingLedger::new(SqliteReservationRepository::new(pool), config.ledger);
    let app = routes::router(ledger);
    let addr = config.server.address.parse::<SocketAddr>()?;

    match &config.server.tls {
        Some(tls) => {
            let rustls = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
            info!("HTTPS で待ち受けます: {}", addr);
            axum_server::bind_rustls(addr, rustls)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            info!("HTTP で待ち受けます: {}", addr);
            axum_server::bind(addr)
                .serve(app.into_make_service())
                .await?;
        }
    }
    Ok(())
}
