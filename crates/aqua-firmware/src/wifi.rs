//! Wi-Fi station bring-up and the background tasks that keep it alive

use aqua_core::{AppError, InternetConfig};
use embassy_net::Runner;
use embassy_time::{Duration, Timer};
use esp_hal::peripherals::WIFI;
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent, WifiStaState};
use log::{error, info, warn};
use static_cell::StaticCell;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

static RADIO: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();

/// Initialise the radio and hand back the station controller and device.
pub fn start_radio(
    wifi: WIFI<'static>,
) -> Result<(WifiController<'static>, WifiDevice<'static>), AppError> {
    let radio = esp_radio::init()
        .map_err(|_| AppError::message(AppError::Wifi, "radio controller init failed"))?;
    let radio = RADIO.init(radio);

    let (controller, interfaces) = esp_radio::wifi::new(radio, wifi, Default::default())
        .map_err(|_| AppError::message(AppError::Wifi, "wifi driver init failed"))?;

    Ok((controller, interfaces.sta))
}

fn client_mode(internet: &InternetConfig<'_>) -> ModeConfig {
    ModeConfig::Client(
        ClientConfig::default()
            .with_ssid(internet.ssid.into())
            .with_password(internet.password.into()),
    )
}

/// Keep the station associated, reconnecting after every drop.
///
/// The station loop only observes the result through the network stack.
#[embassy_executor::task]
pub async fn connection_task(
    mut controller: WifiController<'static>,
    internet: &'static InternetConfig<'static>,
) {
    info!("Starting WiFi connection task for '{}'", internet.ssid);
    loop {
        if esp_radio::wifi::sta_state() == WifiStaState::Connected {
            controller.wait_for_event(WifiEvent::StaDisconnected).await;
            warn!("WiFi link lost");
            Timer::after(RECONNECT_DELAY).await;
        }

        if !matches!(controller.is_started(), Ok(true)) {
            if let Err(e) = controller.set_config(&client_mode(internet)) {
                error!("WiFi config rejected: {:?}", e);
                Timer::after(RECONNECT_DELAY).await;
                continue;
            }
            if let Err(e) = controller.start_async().await {
                error!("WiFi start failed: {:?}", e);
                Timer::after(RECONNECT_DELAY).await;
                continue;
            }
            info!("WiFi started");
        }

        match controller.connect_async().await {
            Ok(()) => info!("WiFi associated"),
            Err(e) => {
                warn!("WiFi connect failed: {:?}", e);
                Timer::after(RECONNECT_DELAY).await;
            }
        }
    }
}

#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}
