//! Dashboard model: rolling resource series, context gauge, and the status
//! readouts the dashboard view renders.

use crate::link::protocol::ContextUsage;
use std::collections::VecDeque;

/// Fixed length of each rolling series. Every push evicts the oldest point.
pub const SERIES_LEN: usize = 20;

/// Rolling window of percentage samples, seeded with zeros so the chart has a
/// stable width from the first draw.
#[derive(Debug, Clone)]
pub struct StatSeries {
    points: VecDeque<f64>,
}

impl StatSeries {
    pub fn new() -> Self {
        let mut points = VecDeque::with_capacity(SERIES_LEN);
        points.resize(SERIES_LEN, 0.0);
        Self { points }
    }

    /// Append a sample and drop the oldest; the length never changes.
    pub fn push(&mut self, value: f64) {
        self.points.push_back(value);
        self.points.pop_front();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> f64 {
        self.points.back().copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().copied()
    }

    /// Samples rounded and clamped for a ratatui sparkline.
    pub fn sparkline_data(&self) -> Vec<u64> {
        self.points
            .iter()
            .map(|value| value.round().clamp(0.0, 100.0) as u64)
            .collect()
    }
}

impl Default for StatSeries {
    fn default() -> Self {
        Self::new()
    }
}

/// Live system readouts pushed by the backend.
#[derive(Debug)]
pub struct Dashboard {
    cpu: StatSeries,
    ram: StatSeries,
    cpu_now: f64,
    ram_now: f64,
    ram_mb: Option<f64>,
    backend_tokens: Option<u64>,
    context: Option<ContextUsage>,
    status: String,
    model: Option<String>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            cpu: StatSeries::new(),
            ram: StatSeries::new(),
            cpu_now: 0.0,
            ram_now: 0.0,
            ram_mb: None,
            backend_tokens: None,
            context: None,
            status: "OFFLINE".to_string(),
            model: None,
        }
    }

    /// Ingest one `system_stats` push.
    pub fn on_stats(&mut self, cpu: f64, ram: f64, ram_mb: Option<f64>, tokens: Option<u64>) {
        self.cpu_now = cpu;
        self.ram_now = ram;
        self.cpu.push(cpu);
        self.ram.push(ram);
        if ram_mb.is_some() {
            self.ram_mb = ram_mb;
        }
        if tokens.is_some() {
            self.backend_tokens = tokens;
        }
    }

    pub fn set_context(&mut self, usage: ContextUsage) {
        self.context = Some(usage);
    }

    pub fn set_status(&mut self, status: &str, model: Option<String>) {
        self.status = status.to_uppercase();
        if model.is_some() {
            self.model = model;
        }
    }

    pub fn set_offline(&mut self) {
        self.status = "OFFLINE".to_string();
    }

    pub fn set_model(&mut self, model: String) {
        self.model = Some(model);
    }

    pub fn cpu_series(&self) -> &StatSeries {
        &self.cpu
    }

    pub fn ram_series(&self) -> &StatSeries {
        &self.ram
    }

    pub fn cpu_now(&self) -> f64 {
        self.cpu_now
    }

    pub fn ram_now(&self) -> f64 {
        self.ram_now
    }

    pub fn ram_mb(&self) -> Option<f64> {
        self.ram_mb
    }

    pub fn backend_tokens(&self) -> Option<u64> {
        self.backend_tokens
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_online(&self) -> bool {
        self.status == "ONLINE"
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Context fill percentage in `[0, 100]`, or 0 before the first push.
    pub fn context_percent(&self) -> f64 {
        self.context.map(|usage| context_percent(&usage)).unwrap_or(0.0)
    }

    /// `"current / max tokens"`, or a dash before the first push.
    pub fn context_label(&self) -> String {
        match self.context {
            Some(usage) => format!("{} / {} tokens", usage.current, usage.max),
            None => "- / - tokens".to_string(),
        }
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

/// Fill percentage for a context push, clamped to `[0, 100]`. A zero `max`
/// reads as a full bar once any tokens are used and empty otherwise.
pub fn context_percent(usage: &ContextUsage) -> f64 {
    if usage.max == 0 {
        return if usage.current == 0 { 0.0 } else { 100.0 };
    }
    let percent = usage.current as f64 / usage.max as f64 * 100.0;
    percent.min(100.0)
}
