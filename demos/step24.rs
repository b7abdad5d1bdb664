use std::{collections::BTreeMap, fs::File, io::BufWriter, sync::Arc};

use fixed::types::{I16F16, U16F16};
use serde::Serialize;
use step24::{
    control::{ControlConfig, ControlLoop, DutySink, SampleSource},
    duty::DutyTriple,
    tracker::SharedPhaseState,
    waveform, Amplitude, RawSamplePair,
};

/// Control cycles per second.
const CYCLE_HZ: u32 = 6_000;
/// Control cycles between two velocity samples.
const VELOCITY_PERIOD: u32 = 100;
/// Peak deviation of the simulated sensor signals.
const SENSOR_AMPLITUDE: u8 = 120;

#[derive(Serialize)]
struct Values {
    time_ns: u64,
    angle_rad: f32,
    u_sense: u8,
    v_sense: u8,
    detected_phase: u8,
    accepted: u8,
    commanded_step: u8,
    duty: [u8; 3],
    velocity: u16,
    electrical_hz: f32,
}

/// A rotor spinning at a fixed electrical speed, seen through the ideal
/// sensor model.
struct SimulatedRotor {
    angle: I16F16,
    increment: I16F16,
}

impl SampleSource for SimulatedRotor {
    fn acquire(&mut self) -> RawSamplePair {
        let samples = waveform::sensor_samples(self.angle, SENSOR_AMPLITUDE);
        self.angle = waveform::normalize(self.angle + self.increment);
        samples
    }
}

/// Stand-in for the three PWM compare registers.
#[derive(Default)]
struct PwmRegisters {
    compare: [u8; 3],
}

impl DutySink for PwmRegisters {
    fn write(&mut self, duty: DutyTriple) {
        self.compare = duty.to_array();
    }
}

fn main() -> Result<(), anyhow::Error> {
    let mut writer = mcap::Writer::new(BufWriter::new(File::create("step24.mcap")?))?;
    let my_channel = mcap::Channel {
        topic: String::from("step24"),
        schema: Some(Arc::new(mcap::Schema {
            name: "".to_owned(),
            encoding: "".to_owned(),
            data: std::borrow::Cow::default(),
        })),
        message_encoding: "cbor".to_owned(),
        metadata: BTreeMap::default(),
    };
    let channel_id = writer.add_channel(&my_channel)?;

    // Two electrical revolutions per second.
    let electrical_rev_per_sec = 2;
    let rotor = SimulatedRotor {
        angle: I16F16::ZERO,
        increment: I16F16::from_num(std::f64::consts::TAU) * electrical_rev_per_sec
            / CYCLE_HZ as i32,
    };
    let config = ControlConfig {
        amplitude: Amplitude::new(40),
        ..ControlConfig::default()
    };

    let state = SharedPhaseState::new();
    let mut control = ControlLoop::new(rotor, PwmRegisters::default(), config);
    let tick_hz = U16F16::from_num(CYCLE_HZ / VELOCITY_PERIOD);
    let dt_ns = 1_000_000_000 / u64::from(CYCLE_HZ);

    for cycle in 0..(5 * CYCLE_HZ) {
        let time_ns = u64::from(cycle) * dt_ns;
        let angle_rad = control.source_mut().angle.to_num::<f32>();
        let report = control.cycle(&state);

        // The velocity tick would normally be a timer interrupt.
        if cycle % VELOCITY_PERIOD == VELOCITY_PERIOD - 1 {
            state.sample_velocity();
        }
        let velocity = state.velocity();

        let mut buffer = Vec::with_capacity(128);
        ciborium::into_writer(
            &Values {
                time_ns,
                angle_rad,
                u_sense: report.samples.u_sense,
                v_sense: report.samples.v_sense,
                detected_phase: report.detected.get(),
                accepted: report.accepted,
                commanded_step: report.step.get(),
                duty: control.sink().compare,
                velocity,
                electrical_hz: waveform::electrical_hz(velocity, tick_hz).to_num(),
            },
            &mut buffer,
        )?;
        writer.write_to_known_channel(
            &mcap::records::MessageHeader {
                channel_id,
                sequence: cycle,
                log_time: time_ns,
                publish_time: time_ns,
            },
            &buffer,
        )?;
    }

    writer.finish()?;

    println!(
        "final velocity: {} steps per {} cycles ({} Hz electrical)",
        state.velocity(),
        VELOCITY_PERIOD,
        waveform::electrical_hz(state.velocity(), tick_hz)
    );

    Ok(())
}
