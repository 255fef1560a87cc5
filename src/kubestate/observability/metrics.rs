/*
 * Copyright (C) 2024 The Kubestate Authors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 * http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::error::Error;
use std::sync::OnceLock;
use std::time::Duration;

use prometheus::core::Collector;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder,
};

static REGISTRY: OnceLock<Registry> = OnceLock::new();
static STORE_OBJECTS: OnceLock<IntGaugeVec> = OnceLock::new();
static STORE_EVENTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
static STORE_RENDER_DURATION: OnceLock<HistogramVec> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| {
        Registry::new_custom(Some("kubestate".to_string()), None)
            .expect("failed to initialise kubestate metrics registry")
    })
}

fn register_collector<C>(collector: C) -> C
where
    C: Clone + Collector + Send + Sync + 'static,
{
    registry()
        .register(Box::new(collector.clone()))
        .expect("failed to register kubestate metric collector");
    collector
}

fn store_objects() -> &'static IntGaugeVec {
    STORE_OBJECTS.get_or_init(|| {
        let opts = Opts::new("objects", "Objects currently cached by a metrics store")
            .subsystem("store");
        let gauge =
            IntGaugeVec::new(opts, &["resource"]).expect("failed to build store objects gauge");
        register_collector(gauge)
    })
}

fn store_events_total() -> &'static IntCounterVec {
    STORE_EVENTS_TOTAL.get_or_init(|| {
        let opts = Opts::new(
            "events_total",
            "Metrics store mutations grouped by resource and event",
        )
        .subsystem("store");
        let counter = IntCounterVec::new(opts, &["resource", "event"])
            .expect("failed to build store events counter");
        register_collector(counter)
    })
}

fn store_render_duration() -> &'static HistogramVec {
    STORE_RENDER_DURATION.get_or_init(|| {
        let opts = HistogramOpts::new(
            "render_duration_seconds",
            "Time spent rendering one object's metric families",
        )
        .subsystem("store")
        .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]);
        let histogram = HistogramVec::new(opts, &["resource"])
            .expect("failed to build store render histogram");
        register_collector(histogram)
    })
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StoreEvent {
    Add,
    Update,
    Delete,
    Replace,
}

impl StoreEvent {
    fn as_label(self) -> &'static str {
        match self {
            StoreEvent::Add => "add",
            StoreEvent::Update => "update",
            StoreEvent::Delete => "delete",
            StoreEvent::Replace => "replace",
        }
    }
}

/// Publishes the number of objects held by the store for `resource`.
pub fn set_store_objects(resource: &str, count: usize) {
    store_objects()
        .with_label_values(&[resource])
        .set(count as i64);
}

pub fn record_store_event(resource: &str, event: StoreEvent) {
    store_events_total()
        .with_label_values(&[resource, event.as_label()])
        .inc();
}

pub fn observe_render(resource: &str, duration: Duration) {
    store_render_duration()
        .with_label_values(&[resource])
        .observe(duration.as_secs_f64());
}

/// Encodes all registered metrics using the Prometheus text exposition
/// format.
pub fn gather() -> Result<Vec<u8>, Box<dyn Error + Send + Sync>> {
    let metric_families = registry().gather();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|err| Box::new(err) as Box<dyn Error + Send + Sync>)?;
    Ok(buffer)
}
