//! Command-line wrapper around the device façade
//!
//! Usage: streamdeck-cli <devices|brightness|image|clear|reset> [args]

use std::process::ExitCode;

use hidapi::HidApi;
use image::imageops::FilterType;
use streamdeck_rs_usb::{devices, new_hidapi, Device, Error};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    if let Err(e) = run().await {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("help");

    let api = new_hidapi()?;

    match command {
        "devices" => list_devices(&api).await?,

        "brightness" => {
            let percent: u8 = args
                .get(2)
                .ok_or("usage: streamdeck-cli brightness <percentage>")?
                .parse()
                .map_err(|_| "supplied parameter is not a valid number")?;

            let device = first_device(&api)?;
            device.set_brightness(percent).await?;
        }

        "image" => {
            let key: u8 = args
                .get(2)
                .ok_or("usage: streamdeck-cli image <key> <image>")?
                .parse()
                .map_err(|_| "supplied key is not a valid number")?;
            let path = args.get(3).ok_or("usage: streamdeck-cli image <key> <image>")?;

            let device = first_device(&api)?;
            let pixels = device.profile().pixels;
            if pixels == 0 {
                return Err(Box::new(Error::UnsupportedOperation("key displays")));
            }

            let img = image::open(path)?.resize_exact(pixels, pixels, FilterType::Lanczos3);
            device.set_image(key, &img).await?;
        }

        "clear" => first_device(&api)?.clear().await?,

        "reset" => first_device(&api)?.reset().await?,

        "help" => usage(),

        _ => {
            usage();
            return Err(format!("unknown command: {}", command).into());
        }
    }

    Ok(())
}

async fn list_devices(api: &HidApi) -> Result<(), Box<dyn std::error::Error>> {
    let mut devs = devices(api);
    if devs.is_empty() {
        return Err(Box::new(Error::DeviceNotFound));
    }

    println!("Found {} devices:", devs.len());
    for device in &mut devs {
        device.open(api)?;
        let version = device.firmware_version().await?;
        println!(
            "Serial {} with {} keys ({}, firmware {})",
            device.serial(),
            device.profile().keys,
            device.profile().name,
            version,
        );
        device.close();
    }

    Ok(())
}

fn first_device(api: &HidApi) -> Result<Device, Error> {
    let mut device = devices(api).into_iter().next().ok_or(Error::DeviceNotFound)?;
    device.open(api)?;
    Ok(device)
}

fn usage() {
    println!("usage: streamdeck-cli <command> [args]");
    println!();
    println!("commands:");
    println!("  devices                 list all available Stream Deck devices");
    println!("  brightness <percent>    control the brightness of the keys");
    println!("  image <key> <image>     set an image on a key");
    println!("  clear                   clear all images");
    println!("  reset                   reset the device");
}
