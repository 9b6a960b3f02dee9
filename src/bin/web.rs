use actix_web::{App, HttpServer, web};
use email_verifier::{
    config::{BIND_HOST, PORT},
    dns::{DnsResolver, MailResolver},
    server,
};
use env_logger::Env;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    // one resolver shared by every worker; it holds no per-request state
    let resolver: Arc<dyn MailResolver> = Arc::new(DnsResolver::new()?);

    log::info!("starting server at :{}", PORT);

    let http_server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::from(resolver.clone()))
            .configure(server::configure)
            .wrap(actix_web::middleware::Logger::default())
    })
        .workers(num_cpus::get())         // spawn one worker per CPU core
        .keep_alive(std::time::Duration::from_secs(75)) // typical production keep-alive
        .bind((BIND_HOST, PORT));

    let http_server = match http_server {
        Ok(http_server) => http_server,
        Err(e) => {
            log::error!("Error in starting the server: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = http_server.run().await {
        log::error!("Server stopped with error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
