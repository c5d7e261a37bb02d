//! System capability detection and guidance.

use std::path::Path;

use clipsync_common::config::CaptureDefaults;

use crate::gst_device::microphone_available;
use crate::pipeline::{element_available, REQUIRED_ELEMENTS};

/// A system capability recording may need.
#[derive(Debug, Clone)]
pub struct Capability {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub required: bool,
    pub fix_instructions: Option<String>,
}

/// Check all capabilities and report status.
pub fn check_capabilities(capture: &CaptureDefaults) -> Vec<Capability> {
    let mut caps = vec![
        check_camera_node("Back camera", &capture.back_device, true),
        check_camera_node("Front camera", &capture.front_device, false),
        check_microphone(),
    ];
    caps.extend(REQUIRED_ELEMENTS.iter().map(|factory| check_element(factory)));
    caps
}

fn check_camera_node(name: &str, node: &str, required: bool) -> Capability {
    let exists = Path::new(node).exists();
    let readable = exists && std::fs::File::open(node).is_ok();

    let fix_instructions = if !exists {
        Some(format!(
            "No device at {node}; list cameras with `v4l2-ctl --list-devices` and set capture.{}_device",
            if name.starts_with("Front") { "front" } else { "back" }
        ))
    } else if !readable {
        Some("Add user to video group: sudo usermod -aG video $USER (logout required)".to_string())
    } else {
        None
    };

    Capability {
        name: name.to_string(),
        description: format!("Video4Linux source {node}"),
        available: readable,
        required,
        fix_instructions,
    }
}

fn check_microphone() -> Capability {
    let available = microphone_available();
    Capability {
        name: "Microphone".to_string(),
        description: "PipeWire/PulseAudio/ALSA audio source".to_string(),
        available,
        required: true,
        fix_instructions: (!available)
            .then(|| "Install PipeWire: sudo apt install pipewire pipewire-pulse".to_string()),
    }
}

fn check_element(factory: &str) -> Capability {
    let available = element_available(factory);
    Capability {
        name: format!("GStreamer {factory}"),
        description: "Element used by the recording pipeline".to_string(),
        available,
        required: true,
        fix_instructions: (!available).then(|| {
            "Install GStreamer plugins: sudo apt install gstreamer1.0-plugins-good gstreamer1.0-plugins-ugly gstreamer1.0-libav".to_string()
        }),
    }
}

/// Print a user-friendly capability report.
pub fn print_capability_report(capabilities: &[Capability]) {
    println!("ClipSync System Capabilities:");
    println!("{}", "-".repeat(60));

    for cap in capabilities {
        let status = if cap.available {
            "[OK]"
        } else if cap.required {
            "[MISSING - REQUIRED]"
        } else {
            "[MISSING - OPTIONAL]"
        };

        println!("  {} {}: {}", status, cap.name, cap.description);

        if let Some(ref fix) = cap.fix_instructions {
            println!("    Fix: {fix}");
        }
    }
}

/// Whether every required capability is present.
pub fn all_required_available(capabilities: &[Capability]) -> bool {
    capabilities.iter().all(|c| c.available || !c.required)
}
