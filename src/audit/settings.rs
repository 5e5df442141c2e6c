/// Network throttling applied by Lighthouse.
#[derive(Clone, Debug, PartialEq)]
pub struct Throttling {
    pub rtt_ms: u32,
    pub throughput_kbps: u32,
    pub cpu_slowdown_multiplier: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScreenEmulation {
    pub mobile: bool,
    pub width: u32,
    pub height: u32,
    pub device_scale_factor: u32,
    pub disabled: bool,
}

/// Lighthouse run configuration. The defaults are fixed so runs stay
/// comparable: desktop, fast network, no CPU slowdown.
#[derive(Clone, Debug, PartialEq)]
pub struct AuditSettings {
    pub only_categories: Vec<String>,
    pub form_factor: String,
    pub throttling: Throttling,
    pub screen_emulation: ScreenEmulation,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            only_categories: vec!["performance".to_string(), "seo".to_string()],
            form_factor: "desktop".to_string(),
            throttling: Throttling {
                rtt_ms: 40,
                throughput_kbps: 10240,
                cpu_slowdown_multiplier: 1,
            },
            screen_emulation: ScreenEmulation {
                mobile: false,
                width: 1350,
                height: 940,
                device_scale_factor: 1,
                disabled: false,
            },
        }
    }
}

impl AuditSettings {
    /// Command-line flags for the `lighthouse` CLI, connecting to `port`.
    pub fn cli_args(&self, port: u16) -> Vec<String> {
        let t = &self.throttling;
        let s = &self.screen_emulation;
        vec![
            format!("--port={port}"),
            "--output=json".to_string(),
            "--quiet".to_string(),
            format!("--only-categories={}", self.only_categories.join(",")),
            format!("--form-factor={}", self.form_factor),
            format!("--throttling.rttMs={}", t.rtt_ms),
            format!("--throttling.throughputKbps={}", t.throughput_kbps),
            format!("--throttling.cpuSlowdownMultiplier={}", t.cpu_slowdown_multiplier),
            format!("--screenEmulation.mobile={}", s.mobile),
            format!("--screenEmulation.width={}", s.width),
            format!("--screenEmulation.height={}", s.height),
            format!("--screenEmulation.deviceScaleFactor={}", s.device_scale_factor),
            format!("--screenEmulation.disabled={}", s.disabled),
        ]
    }
}
