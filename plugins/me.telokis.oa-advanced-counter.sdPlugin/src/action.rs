use counter_core::CounterSettings;
use openaction::*;

use crate::counter::ACTION_UUID;
use crate::handler::{self, Reply};

pub struct AdvancedCounterAction;

#[async_trait]
impl Action for AdvancedCounterAction {
    const UUID: ActionUuid = ACTION_UUID;
    type Settings = CounterSettings;

    async fn will_appear(&self, instance: &Instance, settings: &Self::Settings) -> OpenActionResult<()> {
        send(instance, handler::appear(settings)).await
    }

    async fn key_up(&self, instance: &Instance, settings: &Self::Settings) -> OpenActionResult<()> {
        send(instance, handler::increment(settings, settings.step).await).await
    }

    async fn dial_up(&self, instance: &Instance, settings: &Self::Settings) -> OpenActionResult<()> {
        send(instance, handler::increment(settings, settings.step).await).await
    }

    async fn dial_rotate(
        &self,
        instance: &Instance,
        settings: &Self::Settings,
        ticks: i16,
        _pressed: bool,
    ) -> OpenActionResult<()> {
        send(instance, handler::dial_rotate(settings, ticks).await).await
    }

    async fn did_receive_settings(
        &self,
        instance: &Instance,
        settings: &Self::Settings,
    ) -> OpenActionResult<()> {
        send(instance, handler::settings_received(settings).await).await
    }
}

async fn send(instance: &Instance, replies: Vec<Reply>) -> OpenActionResult<()> {
    for reply in replies {
        match reply {
            Reply::ShowAlert => instance.show_alert().await?,
            Reply::SetSettings(settings) => instance.set_settings(&settings).await?,
            Reply::SetTitle(title) => instance.set_title(Some(title), None).await?,
        }
    }
    Ok(())
}
