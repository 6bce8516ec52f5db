use tracing::error;

#[tokio::main]
async fn main() {
    foodtinder::init_tracing();

    if let Err(e) = foodtinder::start_server().await {
        error!("{e:#}");
        std::process::exit(1);
    }
}
