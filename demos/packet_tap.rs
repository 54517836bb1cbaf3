//! Packet tap: stream a display's packets to raw TCP clients
//!
//! Run with: cargo run --example packet_tap SOURCE [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example packet_tap ./cat.gif                       # binds to 127.0.0.1:25590
//!   cargo run --example packet_tap https://example.com/cat.gif 0.0.0.0:25590
//!
//! Every TCP client is treated as a player standing in front of the display.
//! It receives length-framed play packets exactly as the encoder stage would
//! write them:
//!
//!   nc localhost 25590 | xxd | head
//!
//! Displays are persisted to `displays.json` in the working directory and
//! reloaded on the next start.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use framed_image::connection::{ChannelPipeline, DEFAULT_ENCODER_MARKER, DEFAULT_QUEUE_DEPTH};
use framed_image::{
    ClientId, CreateRequest, Facing, FrameService, JsonFileStore, Location, ServiceConfig,
    StaticWorld,
};

fn print_usage() {
    eprintln!("Usage: packet_tap SOURCE [BIND_ADDR]");
    eprintln!();
    eprintln!("  SOURCE     image URL or path (GIFs animate)");
    eprintln!("  BIND_ADDR  address to listen on (default 127.0.0.1:25590)");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let Some(source) = args.get(1).cloned() else {
        print_usage();
        std::process::exit(1);
    };
    let bind_addr: SocketAddr = match args.get(2) {
        Some(addr) => addr.parse()?,
        None => "127.0.0.1:25590".parse()?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("framed_image=debug".parse()?)
                .add_directive("packet_tap=debug".parse()?),
        )
        .init();

    let origin = Location::new("world", 0, 80, 0);
    let config = ServiceConfig::default().dithering(true);
    let service = Arc::new(FrameService::new(
        config,
        StaticWorld::new(),
        JsonFileStore::new("displays.json"),
    ));

    let reloaded = service.reload().await?;
    if reloaded == 0 {
        let display = service
            .create(CreateRequest {
                location: origin.clone(),
                facing: Facing::South,
                width: 2,
                height: 2,
                source,
            })
            .await?;
        println!("Created display {} ({} frames)", display.id(), display.frame_count());
    } else {
        println!("Reloaded {} display(s) from displays.json", reloaded);
    }

    let driver = service.spawn_driver();
    let listener = TcpListener::bind(bind_addr).await?;
    println!("Listening on {}", bind_addr);

    let accept = {
        let service = Arc::clone(&service);
        let origin = origin.clone();
        async move {
            loop {
                let (socket, peer) = match listener.accept().await {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to accept connection");
                        continue;
                    }
                };

                let client = ClientId::new(peer.to_string());
                let handlers = vec![DEFAULT_ENCODER_MARKER.to_string(), "encoder".to_string()];
                let (pipeline, rx) = ChannelPipeline::new(handlers, DEFAULT_QUEUE_DEPTH);
                let (_read, write) = socket.into_split();
                let writer = ChannelPipeline::spawn_writer(rx, write);

                service.world().place(client.clone(), origin.clone());
                service.register_connection(client.clone(), Arc::new(pipeline));
                service.spawn_player(&client, &origin.world).await;
                tracing::info!(client = %client, "Tap connected");

                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    if let Ok(Err(e)) = writer.await {
                        tracing::debug!(client = %client, error = %e, "Tap write failed");
                    }
                    service.unregister_connection(&client);
                    service.world().remove(&client);
                    tracing::info!(client = %client, "Tap disconnected");
                });
            }
        }
    };

    tokio::select! {
        _ = accept => {}
        _ = tokio::signal::ctrl_c() => {
            println!("Shutting down");
        }
    }

    driver.abort();
    service.shutdown().await;
    Ok(())
}
