//! AirTouch climate entities driven by an in-memory console

use std::sync::Arc;

use airtouch_api::memory::{AcConfig, ConsoleConfig, MemoryAirConditioner, MemoryAirTouch, ZoneConfig};
use airtouch_api::{
    AcFanSpeed, AcMode, AcPowerState, AirConditioner, AirTouch, AirTouchError, AirTouchModel,
    Zone, ZonePowerState,
};
use ha_airtouch::{async_setup_entry, async_unload_entry, discover_entities, AirTouchEntry};
use ha_climate::consts::*;
use ha_climate::{
    ClimateEntity, ClimateError, ClimatePlatform, ClimateServiceCall, HvacAction, HvacMode,
    TemperatureRequest,
};
use serde_json::json;

const AC: &str = "climate.ducted";
const LIVING: &str = "climate.living";
const BEDROOM: &str = "climate.bedroom";

fn console() -> Arc<MemoryAirTouch> {
    MemoryAirTouch::new(ConsoleConfig {
        serial: "AT5-000123".to_string(),
        name: "Home".to_string(),
        model: AirTouchModel::AirTouch5,
        air_conditioners: vec![AcConfig {
            id: 0,
            name: "Ducted".to_string(),
            power_state: AcPowerState::On,
            mode: AcMode::Cool,
            fan_speed: AcFanSpeed::Low,
            current_temp: Some(24.5),
            set_point: Some(22.0),
            zones: vec![
                ZoneConfig {
                    id: 0,
                    name: "Living".to_string(),
                    power_state: ZonePowerState::On,
                    current_temp: Some(23.0),
                    set_point: Some(21.0),
                },
                ZoneConfig {
                    id: 1,
                    name: "Bedroom".to_string(),
                    power_state: ZonePowerState::Off,
                    current_temp: Some(20.0),
                    set_point: Some(19.0),
                },
                ZoneConfig {
                    id: 2,
                    name: "Hallway".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }],
    })
}

fn unit(console: &MemoryAirTouch) -> Arc<MemoryAirConditioner> {
    console.air_conditioner(0).unwrap()
}

/// Console and AC entity, without a platform
fn ac_entity() -> (Arc<MemoryAirTouch>, Arc<dyn ClimateEntity>) {
    let console = console();
    let entities = discover_entities(&[console.clone() as Arc<dyn AirTouch>]);
    let entity = entities[0].clone();
    (console, entity)
}

async fn setup() -> (Arc<MemoryAirTouch>, ClimatePlatform) {
    let console = console();
    let platform = ClimatePlatform::new();
    let entry = AirTouchEntry {
        entry_id: "entry-1".to_string(),
        consoles: vec![console.clone() as Arc<dyn AirTouch>],
    };
    async_setup_entry(&entry, &platform).await;
    (console, platform)
}

#[tokio::test]
async fn test_discovery_skips_zones_without_sensor() {
    let console = console();
    let entities = discover_entities(&[console as Arc<dyn AirTouch>]);

    let unique_ids: Vec<_> = entities.iter().filter_map(|e| e.unique_id()).collect();
    assert_eq!(
        unique_ids,
        vec![
            "AT5-000123_ac_0",
            "AT5-000123_ac_0_zone_0",
            "AT5-000123_ac_0_zone_1",
        ]
    );
}

#[tokio::test]
async fn test_discovery_without_consoles() {
    assert!(discover_entities(&[]).is_empty());
}

#[tokio::test]
async fn test_ac_state() {
    let (_console, platform) = setup().await;
    let state = platform.states().get(AC).unwrap();

    assert_eq!(state.state, "cool");
    assert_eq!(state.attribute::<String>(ATTR_FRIENDLY_NAME).unwrap(), "Ducted");
    assert_eq!(state.attribute::<HvacAction>(ATTR_HVAC_ACTION), Some(HvacAction::Cooling));
    assert_eq!(state.attribute::<f64>(ATTR_CURRENT_TEMPERATURE), Some(24.5));
    assert_eq!(state.attribute::<f64>(ATTR_TEMPERATURE), Some(22.0));
    assert_eq!(state.attribute::<f64>(ATTR_MIN_TEMP), Some(16.0));
    assert_eq!(state.attribute::<f64>(ATTR_MAX_TEMP), Some(30.0));
    assert_eq!(state.attribute::<String>(ATTR_FAN_MODE).unwrap(), "low");
    assert_eq!(
        state.attribute::<Vec<String>>(ATTR_FAN_MODES).unwrap(),
        vec!["auto", "low", "medium", "high"]
    );
    assert_eq!(
        state.attribute::<Vec<HvacMode>>(ATTR_HVAC_MODES).unwrap(),
        vec![
            HvacMode::Off,
            HvacMode::HeatCool,
            HvacMode::Heat,
            HvacMode::Dry,
            HvacMode::FanOnly,
            HvacMode::Cool,
        ]
    );
    assert_eq!(
        state.attribute::<Vec<String>>(ATTR_PRESET_MODES).unwrap(),
        vec![PRESET_NONE, PRESET_AWAY, PRESET_SLEEP]
    );
    assert_eq!(state.attribute::<String>(ATTR_PRESET_MODE).unwrap(), PRESET_NONE);
}

#[tokio::test]
async fn test_ac_hvac_modes_are_deduplicated() {
    let console = MemoryAirTouch::new(ConsoleConfig {
        serial: "AT5-9".to_string(),
        name: "Home".to_string(),
        model: AirTouchModel::AirTouch5,
        air_conditioners: vec![AcConfig {
            supported_modes: vec![AcMode::Auto, AcMode::AutoHeat, AcMode::AutoCool, AcMode::Cool],
            ..Default::default()
        }],
    });
    let entities = discover_entities(&[console as Arc<dyn AirTouch>]);

    assert_eq!(
        entities[0].hvac_modes(),
        vec![HvacMode::Off, HvacMode::HeatCool, HvacMode::Cool]
    );
}

#[tokio::test]
async fn test_ac_off_hides_mode() {
    let (console, entity) = ac_entity();
    let ac = unit(&console);

    for power_state in [AcPowerState::Off, AcPowerState::OffAway] {
        ac.report(power_state, AcMode::Heat);
        assert_eq!(entity.hvac_mode(), Some(HvacMode::Off));
        assert_eq!(entity.hvac_action(), Some(HvacAction::Off));
    }

    // Sleep still runs the unit
    ac.report(AcPowerState::Sleep, AcMode::Heat);
    assert_eq!(entity.hvac_mode(), Some(HvacMode::Heat));
    assert_eq!(entity.hvac_action(), Some(HvacAction::Heating));
}

#[tokio::test]
async fn test_ac_auto_variants_present_as_heat_cool() {
    let (console, entity) = ac_entity();
    let ac = unit(&console);

    ac.report(AcPowerState::On, AcMode::AutoHeat);
    assert_eq!(entity.hvac_mode(), Some(HvacMode::HeatCool));
    assert_eq!(entity.hvac_action(), Some(HvacAction::Heating));

    ac.report(AcPowerState::On, AcMode::Auto);
    assert_eq!(entity.hvac_mode(), Some(HvacMode::HeatCool));
    assert_eq!(entity.hvac_action(), Some(HvacAction::Idle));
}

#[tokio::test]
async fn test_ac_preset_follows_power_state() {
    let (console, entity) = ac_entity();
    let ac = unit(&console);

    let cases = [
        (AcPowerState::On, PRESET_NONE),
        (AcPowerState::Off, PRESET_NONE),
        (AcPowerState::OnAway, PRESET_AWAY),
        (AcPowerState::OffAway, PRESET_AWAY),
        (AcPowerState::Sleep, PRESET_SLEEP),
    ];
    for (power_state, preset) in cases {
        ac.report(power_state, AcMode::Cool);
        assert_eq!(entity.preset_mode().as_deref(), Some(preset), "{power_state:?}");
    }
}

#[tokio::test]
async fn test_ac_set_hvac_mode() {
    let (console, entity) = ac_entity();
    let ac = unit(&console);

    entity.set_hvac_mode(HvacMode::Off).await.unwrap();
    assert_eq!(ac.power_state(), AcPowerState::Off);
    assert_eq!(ac.mode(), AcMode::Cool);

    entity.set_hvac_mode(HvacMode::Heat).await.unwrap();
    assert_eq!(ac.power_state(), AcPowerState::On);
    assert_eq!(ac.mode(), AcMode::Heat);

    entity.set_hvac_mode(HvacMode::HeatCool).await.unwrap();
    assert_eq!(ac.mode(), AcMode::Auto);
}

#[tokio::test]
async fn test_ac_set_hvac_mode_without_ac_equivalent() {
    let (console, entity) = ac_entity();

    let err = entity.set_hvac_mode(HvacMode::Auto).await.unwrap_err();
    assert!(matches!(err, ClimateError::Lookup { kind: "hvac mode", .. }));
    assert_eq!(unit(&console).mode(), AcMode::Cool);
}

#[tokio::test]
async fn test_ac_set_fan_mode() {
    let (console, entity) = ac_entity();
    let ac = unit(&console);

    entity.set_fan_mode(FAN_HIGH).await.unwrap();
    assert_eq!(ac.fan_speed(), AcFanSpeed::High);

    let err = entity.set_fan_mode("hurricane").await.unwrap_err();
    match err {
        ClimateError::Lookup { kind, value } => {
            assert_eq!(kind, "fan mode");
            assert_eq!(value, "hurricane");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(ac.fan_speed(), AcFanSpeed::High);
}

#[tokio::test]
async fn test_ac_set_preset_mode() {
    let (console, entity) = ac_entity();
    let ac = unit(&console);

    entity.set_preset_mode(PRESET_AWAY).await.unwrap();
    assert_eq!(ac.power_state(), AcPowerState::OnAway);

    entity.set_preset_mode(PRESET_SLEEP).await.unwrap();
    assert_eq!(ac.power_state(), AcPowerState::Sleep);

    // Anything else is logged and ignored
    entity.set_preset_mode(PRESET_NONE).await.unwrap();
    entity.set_preset_mode("boost").await.unwrap();
    assert_eq!(ac.power_state(), AcPowerState::Sleep);
}

#[tokio::test]
async fn test_ac_set_temperature() {
    let (console, entity) = ac_entity();
    let ac = unit(&console);

    entity
        .set_temperature(TemperatureRequest::new(23.5))
        .await
        .unwrap();
    assert_eq!(ac.set_point(), Some(23.5));

    // Out of range values go to the console, which enforces its own bounds
    entity
        .set_temperature(TemperatureRequest::new(40.0))
        .await
        .unwrap();
    assert_eq!(ac.set_point(), Some(30.0));

    let err = entity
        .set_temperature(TemperatureRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClimateError::MissingArgument(ATTR_TEMPERATURE)));
}

#[tokio::test]
async fn test_device_error_is_propagated() {
    let (console, entity) = ac_entity();
    let ac = unit(&console);
    ac.fail_next(AirTouchError::Timeout);

    let err = entity.set_fan_mode(FAN_HIGH).await.unwrap_err();
    let ClimateError::Device(inner) = err else {
        panic!("expected a device error");
    };
    assert_eq!(inner.downcast_ref::<AirTouchError>(), Some(&AirTouchError::Timeout));
    assert_eq!(ac.fan_speed(), AcFanSpeed::Low);
}

#[tokio::test]
async fn test_unsupported_fan_speed_rejected_by_console() {
    let (_console, entity) = ac_entity();

    // Turbo has a mapping but this unit does not support it
    let err = entity.set_fan_mode("turbo").await.unwrap_err();
    let ClimateError::Device(inner) = err else {
        panic!("expected a device error");
    };
    assert_eq!(
        inner.downcast_ref::<AirTouchError>(),
        Some(&AirTouchError::UnsupportedFanSpeed(AcFanSpeed::Turbo))
    );
}

#[tokio::test]
async fn test_zone_device_errors_are_propagated() {
    let console = console();
    let entities = discover_entities(&[console.clone() as Arc<dyn AirTouch>]);
    let bedroom = entities[2].clone();
    let zone = unit(&console).zone(1).unwrap();

    let expect_timeout = |err: ClimateError| {
        let ClimateError::Device(inner) = err else {
            panic!("expected a device error");
        };
        assert_eq!(inner.downcast_ref::<AirTouchError>(), Some(&AirTouchError::Timeout));
    };

    zone.fail_next(AirTouchError::Timeout);
    expect_timeout(bedroom.set_fan_mode(FAN_ON).await.unwrap_err());

    zone.fail_next(AirTouchError::Timeout);
    expect_timeout(bedroom.set_hvac_mode(HvacMode::Cool).await.unwrap_err());

    zone.fail_next(AirTouchError::Timeout);
    expect_timeout(
        bedroom
            .set_temperature(TemperatureRequest::new(18.0))
            .await
            .unwrap_err(),
    );

    assert_eq!(zone.power_state(), ZonePowerState::Off);
    assert_eq!(zone.set_point(), Some(19.0));
}

#[tokio::test]
async fn test_zone_turn_on_follows_ac_mode() {
    let (console, platform) = setup().await;
    let ac = unit(&console);
    let zone = ac.zone(1).unwrap();

    for mode in [AcMode::Dry, AcMode::Fan] {
        zone.set_power(ZonePowerState::Off).await.unwrap();
        ac.report(AcPowerState::On, mode);
        platform.process_pending_updates().await;

        platform
            .call_service(BEDROOM, ClimateServiceCall::TurnOn)
            .await
            .unwrap();
        assert_eq!(zone.power_state(), ZonePowerState::On, "{mode:?}");
        assert_eq!(
            platform.states().get_state(BEDROOM),
            platform.states().get_state(AC)
        );
    }
}

#[tokio::test]
async fn test_zone_state() {
    let (console, platform) = setup().await;

    let living = platform.states().get(LIVING).unwrap();
    assert_eq!(living.state, "cool");
    assert_eq!(living.attribute::<f64>(ATTR_CURRENT_TEMPERATURE), Some(23.0));
    assert_eq!(living.attribute::<f64>(ATTR_TEMPERATURE), Some(21.0));
    assert_eq!(living.attribute::<String>(ATTR_FAN_MODE).unwrap(), FAN_ON);
    assert_eq!(
        living.attribute::<Vec<String>>(ATTR_FAN_MODES).unwrap(),
        vec![FAN_OFF, FAN_ON, "turbo"]
    );
    assert_eq!(
        living.attribute::<Vec<HvacMode>>(ATTR_HVAC_MODES).unwrap(),
        vec![HvacMode::Off, HvacMode::Cool]
    );
    assert!(living.attribute::<String>(ATTR_PRESET_MODE).is_none());

    let bedroom = platform.states().get(BEDROOM).unwrap();
    assert_eq!(bedroom.state, "off");
    assert_eq!(bedroom.attribute::<String>(ATTR_FAN_MODE).unwrap(), FAN_OFF);

    // A running zone is off when its AC is
    unit(&console).report(AcPowerState::OffAway, AcMode::Cool);
    platform.process_pending_updates().await;
    assert_eq!(platform.states().get_state(LIVING).as_deref(), Some("off"));
}

#[tokio::test]
async fn test_zone_commands() {
    let (console, platform) = setup().await;
    let zone = unit(&console).zone(1).unwrap();

    platform
        .call_service(BEDROOM, ClimateServiceCall::SetHvacMode(HvacMode::Cool))
        .await
        .unwrap();
    assert_eq!(zone.power_state(), ZonePowerState::On);
    assert_eq!(platform.states().get_state(BEDROOM).as_deref(), Some("cool"));

    platform
        .call_service(BEDROOM, ClimateServiceCall::SetFanMode("turbo".to_string()))
        .await
        .unwrap();
    assert_eq!(zone.power_state(), ZonePowerState::Turbo);

    platform
        .call_service(BEDROOM, ClimateServiceCall::SetTemperature(TemperatureRequest::new(18.5)))
        .await
        .unwrap();
    assert_eq!(zone.set_point(), Some(18.5));

    platform
        .call_service(BEDROOM, ClimateServiceCall::TurnOff)
        .await
        .unwrap();
    assert_eq!(zone.power_state(), ZonePowerState::Off);
}

#[tokio::test]
async fn test_zone_rejects_presets() {
    let (_console, platform) = setup().await;

    let err = platform
        .call_service(LIVING, ClimateServiceCall::SetPresetMode(PRESET_AWAY.to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, ClimateError::NotSupported(_)));
}

#[tokio::test]
async fn test_zone_refreshes_on_ac_change() {
    let (console, platform) = setup().await;
    let mut changes = platform.states().subscribe();

    unit(&console).report(AcPowerState::On, AcMode::Heat);
    let changed = platform.process_pending_updates().await;

    // A zone that is off still offers the new AC mode
    assert_eq!(changed, 3);
    assert_eq!(platform.states().get_state(AC).as_deref(), Some("heat"));
    assert_eq!(platform.states().get_state(LIVING).as_deref(), Some("heat"));
    assert_eq!(platform.states().get_state(BEDROOM).as_deref(), Some("off"));
    assert_eq!(
        platform
            .states()
            .get(BEDROOM)
            .unwrap()
            .attribute::<Vec<HvacMode>>(ATTR_HVAC_MODES),
        Some(vec![HvacMode::Off, HvacMode::Heat])
    );

    let mut changed_ids = Vec::new();
    for _ in 0..3 {
        changed_ids.push(changes.recv().await.unwrap().entity_id);
    }
    changed_ids.sort();
    assert_eq!(changed_ids, vec![BEDROOM, AC, LIVING]);
}

#[tokio::test]
async fn test_zone_refreshes_on_temperature_report() {
    let (console, platform) = setup().await;

    unit(&console).zone(0).unwrap().report_temperature(25.5);
    assert_eq!(platform.process_pending_updates().await, 1);

    let living = platform.states().get(LIVING).unwrap();
    assert_eq!(living.attribute::<f64>(ATTR_CURRENT_TEMPERATURE), Some(25.5));
}

#[tokio::test]
async fn test_unchanged_report_is_not_republished() {
    let (console, platform) = setup().await;

    unit(&console).report(AcPowerState::On, AcMode::Cool);
    assert_eq!(platform.process_pending_updates().await, 0);
}

#[tokio::test]
async fn test_service_calls_through_platform() {
    let (console, platform) = setup().await;
    let ac = unit(&console);

    platform
        .handle_service_call(
            SERVICE_SET_TEMPERATURE,
            &json!({ "entity_id": AC, "temperature": 20.0, "hvac_mode": "heat" }),
        )
        .await
        .unwrap();
    assert_eq!(ac.mode(), AcMode::Heat);
    assert_eq!(ac.set_point(), Some(20.0));

    platform
        .handle_service_call(
            SERVICE_SET_PRESET_MODE,
            &json!({ "entity_id": AC, "preset_mode": "away" }),
        )
        .await
        .unwrap();
    assert_eq!(ac.power_state(), AcPowerState::OnAway);
    assert_eq!(
        platform
            .states()
            .get(AC)
            .unwrap()
            .attribute::<String>(ATTR_PRESET_MODE)
            .unwrap(),
        PRESET_AWAY
    );

    // Fan modes outside the advertised list never reach the AC
    let err = platform
        .handle_service_call(
            SERVICE_SET_FAN_MODE,
            &json!({ "entity_id": AC, "fan_mode": "turbo" }),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClimateError::InvalidFanMode { .. }));
    assert_eq!(ac.fan_speed(), AcFanSpeed::Low);
}

#[tokio::test]
async fn test_turn_on_prefers_heat_cool() {
    let (console, platform) = setup().await;
    let ac = unit(&console);
    ac.report(AcPowerState::Off, AcMode::Cool);

    platform
        .call_service(AC, ClimateServiceCall::TurnOn)
        .await
        .unwrap();
    assert_eq!(ac.power_state(), AcPowerState::On);
    assert_eq!(ac.mode(), AcMode::Auto);
}

#[tokio::test]
async fn test_setup_and_unload() {
    let console = console();
    let ac = unit(&console);
    let platform = ClimatePlatform::new();
    let entry = AirTouchEntry {
        entry_id: "entry-1".to_string(),
        consoles: vec![console.clone() as Arc<dyn AirTouch>],
    };

    let loaded = async_setup_entry(&entry, &platform).await;
    assert_eq!(loaded.entity_ids, vec![AC, LIVING, BEDROOM]);
    assert_eq!(platform.entity_id_for("AT5-000123_ac_0_zone_1").as_deref(), Some(BEDROOM));

    // The AC entity and both zone entities follow the AC
    assert_eq!(ac.subscriber_count(), 3);
    assert_eq!(ac.zone(0).unwrap().subscriber_count(), 1);
    assert_eq!(ac.zone(2).unwrap().subscriber_count(), 0);

    // Setting up the same console again adds nothing
    assert!(async_setup_entry(&entry, &platform).await.entity_ids.is_empty());
    assert_eq!(ac.subscriber_count(), 3);

    async_unload_entry(&loaded, &platform).await;
    assert!(platform.entity_ids().is_empty());
    assert!(platform.states().is_empty());
    assert_eq!(ac.subscriber_count(), 0);
    assert_eq!(ac.zone(0).unwrap().subscriber_count(), 0);
    assert_eq!(ac.zone(1).unwrap().subscriber_count(), 0);

    // Nothing is published for removed entities
    ac.report(AcPowerState::On, AcMode::Heat);
    assert_eq!(platform.process_pending_updates().await, 0);
}

#[tokio::test]
async fn test_device_info_tree() {
    let (_console, platform) = setup().await;

    let zone = platform.entity(LIVING).unwrap();
    let info = zone.device_info().unwrap();
    assert_eq!(info.manufacturer.as_deref(), Some("Polyaire"));
    assert_eq!(info.model.as_deref(), Some("Zone"));
    assert_eq!(
        info.via_device,
        Some(("airtouch".to_string(), "AT5-000123_ac_0".to_string()))
    );
}
