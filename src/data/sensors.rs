//! Known telemetry channels and their display names.

/// How a channel's values are distributed. Used by the simulator and as a
/// hint for plot ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChannelKind {
    /// Continuous value in `[lo, hi)`.
    Uniform { lo: f64, hi: f64 },
    /// On/off flag, 0 or 1.
    Flag,
    /// Integer counter in `[lo, hi]`.
    Integer { lo: i64, hi: i64 },
    /// Wall-clock seconds.
    Clock,
}

/// A named channel reported by the car.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSpec {
    pub id: &'static str,
    pub kind: ChannelKind,
}

const fn uniform(id: &'static str, lo: f64, hi: f64) -> ChannelSpec {
    ChannelSpec {
        id,
        kind: ChannelKind::Uniform { lo, hi },
    }
}

const fn flag(id: &'static str) -> ChannelSpec {
    ChannelSpec {
        id,
        kind: ChannelKind::Flag,
    }
}

const fn integer(id: &'static str, lo: i64, hi: i64) -> ChannelSpec {
    ChannelSpec {
        id,
        kind: ChannelKind::Integer { lo, hi },
    }
}

/// Every channel the car's telemetry unit reports.
pub const SENSOR_CATALOGUE: &[ChannelSpec] = &[
    flag("alarme_status"),
    uniform("avg_lap_speed", 150.0, 200.0),
    integer("beacon_code", 1000, 9999),
    uniform("box_voltage", 12.0, 14.0),
    flag("correct_stance"),
    flag("correct_speed"),
    uniform("cpu_usage", 0.0, 100.0),
    uniform("cumulative_diff", -5.0, 5.0),
    uniform("cumulative_time", 0.0, 1000.0),
    uniform("current", 0.0, 100.0),
    uniform("stance", 0.0, 100.0),
    uniform("ecu_airbox_temp", -40.0, 150.0),
    uniform("ecu_cooler_temp", 0.0, 100.0),
    flag("ecu_engine_safe_hard"),
    flag("ecu_engine_safe_soft"),
    flag("ecu_fan"),
    uniform("ecu_fuel_pressure", 0.0, 100.0),
    flag("ecu_fuel_pump"),
    uniform("ecu_fuel_temp", -40.0, 150.0),
    uniform("ecu_fuel_total", 0.0, 1000.0),
    integer("ecu_gear", 1, 8),
    uniform("ecu_gear_voltage", 0.0, 5.0),
    flag("ecu_kl15"),
    uniform("ecu_lambida_1", 0.0, 100.0),
    uniform("ecu_lambida_2", 0.0, 100.0),
    flag("ecu_oil_lamp"),
    uniform("ecu_oil_pressure", 20.0, 100.0),
    uniform("ecu_oil_temp", -40.0, 150.0),
    flag("ecu_push_to_pass_block"),
    flag("ecu_push_to_pass_button"),
    uniform("ecu_push_to_pass_delay", 0.0, 10.0),
    flag("ecu_push_to_pass_lamp"),
    flag("ecu_push_to_pass_on"),
    uniform("ecu_push_to_pass_remain", 0.0, 10.0),
    uniform("ecu_push_to_pass_timer", 0.0, 60.0),
    flag("ecu_pit_limit_button"),
    flag("ecu_pit_limit_on"),
    flag("ecu_powershift_on"),
    uniform("ecu_powershift_sensor", 0.0, 100.0),
    uniform("ecu_rpm_limit", 3000.0, 10000.0),
    uniform("ecu_rpm", 0.0, 12000.0),
    flag("ecu_syncro"),
    uniform("ecu_throttle_pedal", 0.0, 100.0),
    uniform("ecu_voltage", 0.0, 14.0),
    uniform("elipse_lap_time", 60.0, 300.0),
    uniform("elipse_time", 0.0, 1000.0),
    uniform("energy used", -80.0, 80.0),
    uniform("front_left_wheel_speed", 0.0, 300.0),
    uniform("front_right_wheel_speed", 0.0, 300.0),
    flag("front_brake"),
    uniform("fuel_economy", 0.0, 20.0),
    integer("lap_number", 1, 100),
    uniform("lap_fuel_left", 0.0, 100.0),
    uniform("lateral_g", -3.0, 3.0),
    flag("logging"),
    uniform("longitudinal_g", -3.0, 3.0),
    uniform("map_position_d", 0.0, 100.0),
    uniform("map_position_x", 0.0, 1000.0),
    uniform("map_position_y", 0.0, 1000.0),
    uniform("map_position_z", 0.0, 1000.0),
    uniform("max_straight_speed", 200.0, 300.0),
    uniform("minimal_corner_speed", 100.0, 200.0),
    ChannelSpec {
        id: "network_time",
        kind: ChannelKind::Clock,
    },
    uniform("oil_temp", -40.0, 150.0),
    flag("pi_ecu_mode"),
    flag("rear_brake"),
    uniform("running_lap_time", 60.0, 300.0),
    uniform("section_diff", -5.0, 5.0),
    uniform("section_time", 0.0, 1000.0),
    uniform("SOC", 0.0, 100.0),
    uniform("SOH", 0.0, 100.0),
    uniform("speed", 0.0, 300.0),
    uniform("steering", -45.0, 45.0),
    uniform("tank_fuel", 0.0, 100.0),
    uniform("tank_fuel_used", 0.0, 100.0),
    uniform("temperature", 0.0, 100.0),
    uniform("voltage", 0.0, 300.0),
    // component temperatures, coloured by status in the monitoring grid
    uniform("combustion_engine_temp", 60.0, 120.0),
    uniform("front_left_tire_temp", 50.0, 110.0),
    uniform("front_right_tire_temp", 50.0, 110.0),
    uniform("rear_left_tire_temp", 50.0, 110.0),
    uniform("rear_right_tire_temp", 50.0, 110.0),
    uniform("front_brake_temp", 50.0, 450.0),
    uniform("rear_brake_temp", 50.0, 450.0),
    uniform("electric_engine_temp", 20.0, 110.0),
    uniform("accumulator_box_temp", 20.0, 110.0),
];

/// Ids of all catalogued channels, in catalogue order.
pub fn sensor_ids() -> impl Iterator<Item = &'static str> {
    SENSOR_CATALOGUE.iter().map(|c| c.id)
}

pub fn find_channel(id: &str) -> Option<&'static ChannelSpec> {
    SENSOR_CATALOGUE.iter().find(|c| c.id == id)
}

/// Human-readable name: underscores become spaces and every word is
/// title-cased (`"ecu_oil_temp"` → `"Ecu Oil Temp"`).
pub fn display_name(sensor_id: &str) -> String {
    let mut out = String::with_capacity(sensor_id.len());
    let mut prev_alpha = false;
    for ch in sensor_id.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}
