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

//! Per-resource cache of rendered metric families.
//!
//! Each object's families are rendered once when the object is added or
//! updated, under the store's write lock so mutations of one key apply in
//! call order. Writing the exposition only concatenates cached text. Headers
//! are written for every family even when no object produced a sample.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use crate::kubestate::k8s::meta::Resource;
use crate::kubestate::logger::log_debug;
use crate::kubestate::metric::generator::FamilySet;
use crate::kubestate::observability::metrics::{self, StoreEvent};
use crate::kubestate::observability::tracing::with_span;

const COMPONENT: &str = "store";

/// Rendered sample blocks of one object, one entry per family.
type RenderedFamilies = Vec<String>;

pub struct MetricsStore<T> {
    resource: String,
    families: FamilySet<T>,
    headers: Vec<String>,
    objects: RwLock<BTreeMap<String, RenderedFamilies>>,
}

impl<T: Resource> MetricsStore<T> {
    pub fn new(resource: impl Into<String>, families: FamilySet<T>) -> Self {
        let headers = families.headers();
        Self {
            resource: resource.into(),
            families,
            headers,
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.read_objects().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_objects().is_empty()
    }

    pub fn contains(&self, object: &T) -> bool {
        self.read_objects()
            .contains_key(&object.metadata().store_key())
    }

    pub fn add(&self, object: &T) {
        self.upsert(object, StoreEvent::Add);
    }

    pub fn update(&self, object: &T) {
        self.upsert(object, StoreEvent::Update);
    }

    pub fn delete(&self, object: &T) {
        let key = object.metadata().store_key();
        let mut objects = self.write_objects();
        if objects.remove(&key).is_none() {
            log_debug(
                COMPONENT,
                "Delete for unknown object",
                &[("resource", &self.resource), ("key", &key)],
            );
        }
        metrics::record_store_event(&self.resource, StoreEvent::Delete);
        metrics::set_store_objects(&self.resource, objects.len());
    }

    /// Drops every cached object and renders `objects` in their place.
    pub fn replace<'a, I>(&self, objects: I)
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        with_span(COMPONENT, "replace", || {
            let mut cached = self.write_objects();
            *cached = objects
                .into_iter()
                .map(|object| (object.metadata().store_key(), self.render(object)))
                .collect();
            let count = cached.len();

            metrics::record_store_event(&self.resource, StoreEvent::Replace);
            metrics::set_store_objects(&self.resource, count);
            log_debug(
                COMPONENT,
                "Replaced store contents",
                &[("resource", &self.resource), ("objects", &count.to_string())],
            );
        })
    }

    /// Writes every family header followed by the samples of all objects
    /// for that family, objects in key order.
    pub fn write_all<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let objects = self.read_objects();
        for (index, header) in self.headers.iter().enumerate() {
            writeln!(out, "{header}")?;
            write_family(&objects, index, out)?;
        }
        Ok(())
    }

    fn upsert(&self, object: &T, event: StoreEvent) {
        let key = object.metadata().store_key();
        let mut objects = self.write_objects();
        objects.insert(key, self.render(object));
        metrics::record_store_event(&self.resource, event);
        metrics::set_store_objects(&self.resource, objects.len());
    }

    fn render(&self, object: &T) -> RenderedFamilies {
        let started = Instant::now();
        let rendered = self
            .families
            .generate(object)
            .iter()
            .map(|family| family.to_text())
            .collect();
        metrics::observe_render(&self.resource, started.elapsed());
        rendered
    }

    fn read_objects(&self) -> RwLockReadGuard<'_, BTreeMap<String, RenderedFamilies>> {
        self.objects
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_objects(&self) -> RwLockWriteGuard<'_, BTreeMap<String, RenderedFamilies>> {
        self.objects
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn write_family<W: Write>(
    objects: &BTreeMap<String, RenderedFamilies>,
    index: usize,
    out: &mut W,
) -> io::Result<()> {
    for rendered in objects.values() {
        if let Some(block) = rendered.get(index) {
            out.write_all(block.as_bytes())?;
        }
    }
    Ok(())
}

/// Writes several stores of the same resource as one exposition, for
/// resources whose objects are sharded across stores. Headers come from the
/// first store.
pub struct MultiStoreWriter<T> {
    stores: Vec<Arc<MetricsStore<T>>>,
}

impl<T: Resource> MultiStoreWriter<T> {
    pub fn new(stores: Vec<Arc<MetricsStore<T>>>) -> Self {
        Self { stores }
    }

    pub fn write_all<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let Some(first) = self.stores.first() else {
            return Ok(());
        };
        let guards = self
            .stores
            .iter()
            .map(|store| store.read_objects())
            .collect::<Vec<_>>();
        for (index, header) in first.headers().iter().enumerate() {
            writeln!(out, "{header}")?;
            for objects in &guards {
                write_family(objects, index, out)?;
            }
        }
        Ok(())
    }
}
