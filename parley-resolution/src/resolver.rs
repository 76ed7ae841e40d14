//! Entity resolution state machine.
//!
//! An [`EntityResolver`] wraps one turn's [`ResolutionStatus`] together with
//! the execution context that owns the composite bag variable. The active
//! record lives in that variable, so every write is immediately visible to
//! anything else reading the context during the turn.
//!
//! States are configurations of the status rather than exclusive tags:
//! soliciting (`resolving_field` set), skipped, disambiguating (candidate
//! values pending), queued (`entity_queue` non-empty) and resolved.

use crate::display::{DisplayDescriptor, DisplayRegistry};
use parley_context::ExecutionContext;
use parley_model::{BagItem, CompositeBagType, Record, ResolutionEvent, ResolutionStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// One slot's display value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayValue {
    pub name: String,
    pub value: Value,
}

pub struct EntityResolver<'a> {
    ctx: &'a mut ExecutionContext,
    status: ResolutionStatus,
    variable_name: String,
    bag_type: CompositeBagType,
    display: DisplayRegistry,
}

impl<'a> EntityResolver<'a> {
    /// Creates a resolver over `variable_name` with the built-in display descriptors.
    pub fn new(ctx: &'a mut ExecutionContext, variable_name: &str, status: ResolutionStatus) -> Self {
        Self::with_display(ctx, variable_name, status, DisplayRegistry::with_builtins())
    }

    pub fn with_display(
        ctx: &'a mut ExecutionContext,
        variable_name: &str,
        mut status: ResolutionStatus,
        display: DisplayRegistry,
    ) -> Self {
        let bag_type = ctx
            .variable_entry(variable_name)
            .map(|v| v.var_type.clone())
            .unwrap_or_default();
        if status.variable_name.is_none() {
            status.variable_name = Some(variable_name.to_string());
        }
        Self {
            ctx,
            status,
            variable_name: variable_name.to_string(),
            bag_type,
            display,
        }
    }

    /// Ends the resolver's borrow of the context, handing back the status.
    pub fn into_status(self) -> ResolutionStatus {
        self.status
    }

    pub fn status(&self) -> &ResolutionStatus {
        &self.status
    }

    pub fn context(&self) -> &ExecutionContext {
        &*self.ctx
    }

    pub fn context_mut(&mut self) -> &mut ExecutionContext {
        &mut *self.ctx
    }

    // ================================================================
    // Schema & status accessors
    // ================================================================

    pub fn variable_name(&self) -> &str {
        &self.variable_name
    }

    /// The bag's type name.
    pub fn entity_name(&self) -> &str {
        &self.bag_type.name
    }

    /// The bag's slot definitions in declaration order.
    pub fn entity_items(&self) -> &[BagItem] {
        &self.bag_type.composite_bag_items
    }

    pub fn event(&self) -> Option<&ResolutionEvent> {
        self.status.event.as_ref()
    }

    pub fn resolving_field(&self) -> Option<&str> {
        self.status.resolving_field.as_deref()
    }

    pub fn skipped_items(&self) -> &[String] {
        &self.status.skipped_items
    }

    pub fn user_input(&self) -> Option<&str> {
        self.status.user_input.as_deref()
    }

    pub fn updated_entities(&self) -> &[Value] {
        &self.status.updated_entities
    }

    pub fn out_of_order_matches(&self) -> &[Value] {
        &self.status.out_of_order_matches
    }

    pub fn resolved_entities(&self) -> &[Record] {
        &self.status.resolved_entities
    }

    pub fn entity_queue(&self) -> &[Record] {
        &self.status.entity_queue
    }

    pub fn prompt_for_value(&self) -> Option<bool> {
        self.status.prompt_for_value
    }

    pub fn is_prompt_for_value(&self) -> bool {
        self.status.prompt_for_value.unwrap_or(false)
    }

    pub fn set_prompt_for_value(&mut self, prompt: bool) {
        self.status.prompt_for_value = Some(prompt);
    }

    // ================================================================
    // Active record
    // ================================================================

    /// The record currently under resolution, if the bag variable holds one.
    pub fn current_entity(&self) -> Option<Record> {
        self.ctx.variable(&self.variable_name).and_then(Record::from_value)
    }

    pub fn get_item_value(&self, slot: &str) -> Option<&Value> {
        self.ctx
            .variable(&self.variable_name)
            .and_then(|entity| entity.get(slot))
    }

    /// Sets a slot on the active record, starting a fresh record if none exists.
    pub fn set_item_value(&mut self, slot: &str, value: Value) {
        let mut entity = self
            .current_entity()
            .unwrap_or_else(|| Record::tagged(&self.bag_type.name));
        entity.set(slot, value);
        self.write_entity(entity);
    }

    pub fn clear_item_value(&mut self, slot: &str) {
        if let Some(mut entity) = self.current_entity() {
            if entity.remove(slot).is_some() {
                self.write_entity(entity);
            }
        }
    }

    /// Replaces the active record and clears the field being solicited.
    ///
    /// The record is written straight into the bag variable of the execution
    /// context.
    pub fn set_current_entity(&mut self, record: Record) {
        debug!(variable = %self.variable_name, "Setting current entity");
        self.status.resolving_field = None;
        self.write_entity(record);
    }

    fn write_entity(&mut self, record: Record) {
        self.ctx
            .set_typed_variable(&self.variable_name, &self.bag_type, record.into_value());
    }

    // ================================================================
    // Validation & disambiguation
    // ================================================================

    pub fn add_validation_error(&mut self, slot: &str, error: impl Into<String>) {
        self.status
            .validation_errors
            .insert(slot.to_string(), error.into());
    }

    pub fn validation_errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.status
            .validation_errors
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn clear_validation_errors(&mut self) {
        self.status.validation_errors.clear();
    }

    /// Candidate values for `slot`, or an empty slice.
    pub fn disambiguation_values(&self, slot: &str) -> &[Value] {
        self.status
            .disambiguation_values
            .get(slot)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // ================================================================
    // Soliciting & skipping
    // ================================================================

    /// Solicits `slot` next, or with `None` leaves the choice of the next
    /// field to the caller. Either way the turn is kept so the user can answer.
    pub fn solicit_input(&mut self, slot: Option<&str>) {
        match slot {
            Some(slot) => {
                debug!(slot, "Soliciting input");
                self.status.resolving_field = Some(slot.to_string());
                self.status.skipped_items.retain(|s| s != slot);
            }
            None => {
                debug!("Deferring next field choice");
                self.status.resolving_field = None;
            }
        }
        self.ctx.keep_turn(true);
    }

    pub fn skip_item(&mut self, slot: &str) {
        if !self.status.is_skipped(slot) {
            self.status.skipped_items.push(slot.to_string());
        }
        if self.status.resolving_field.as_deref() == Some(slot) {
            self.status.resolving_field = None;
        }
        debug!(slot, "Skipped item");
    }

    pub fn unskip_item(&mut self, slot: &str) {
        self.status.skipped_items.retain(|s| s != slot);
    }

    // ================================================================
    // Entity queue
    // ================================================================

    /// Expands the candidate values of `slot` into queued records.
    ///
    /// Record `i` takes the `i`-th candidate of `slot` and the `i`-th
    /// candidate of every other slot that has one (positional pairing, not a
    /// cross product). The first record builds on the active record when
    /// there is one. All candidate lists are consumed. The queue head becomes
    /// the active record and is returned.
    ///
    /// Without candidates for `slot` nothing changes and the current queue
    /// head is returned.
    pub fn queue_entities(&mut self, slot: &str) -> Option<Record> {
        let candidates = self.disambiguation_values(slot).to_vec();
        if candidates.is_empty() {
            return self.peek_entity_queue().cloned();
        }
        debug!(slot, candidates = candidates.len(), "Queueing disambiguated entities");

        for (i, candidate) in candidates.into_iter().enumerate() {
            let mut record = match self.current_entity() {
                Some(active) if i == 0 => active,
                _ => Record::tagged(&self.bag_type.name),
            };
            record.set(slot, candidate);
            for item in self.bag_type.composite_bag_items.iter().filter(|item| item.name != slot) {
                if let Some(value) = self
                    .status
                    .disambiguation_values
                    .get(&item.name)
                    .and_then(|values| values.get(i))
                {
                    record.set(item.name.clone(), value.clone());
                }
            }
            self.status.entity_queue.push(record);
        }
        self.status.disambiguation_values.clear();

        let head = self.peek_entity_queue().cloned();
        if let Some(head) = &head {
            self.set_current_entity(head.clone());
        }
        head
    }

    /// Appends one record without expansion.
    pub fn queue_entity(&mut self, record: Record) {
        self.status.entity_queue.push(record);
    }

    /// Removes and returns the queue head, if any.
    pub fn pop_entity_queue(&mut self) -> Option<Record> {
        if self.status.entity_queue.is_empty() {
            return None;
        }
        Some(self.status.entity_queue.remove(0))
    }

    pub fn peek_entity_queue(&self) -> Option<&Record> {
        self.status.entity_queue.first()
    }

    /// Marks `record` resolved and drops the queue head.
    pub fn add_resolved_entity(&mut self, record: Record) {
        self.status.resolved_entities.push(record);
        self.pop_entity_queue();
        debug!(
            resolved = self.status.resolved_entities.len(),
            queued = self.status.entity_queue.len(),
            "Entity resolved"
        );
    }

    // ================================================================
    // Display values
    // ================================================================

    /// Adds or overrides a display descriptor for this resolver.
    pub fn register_display_descriptor(&mut self, type_ref: &str, descriptor: DisplayDescriptor) {
        self.display.register(type_ref, descriptor);
    }

    pub fn get_display_value(&self, type_ref: &str, raw: &Value) -> Value {
        self.display.display_value(type_ref, raw)
    }

    /// Display value of one slot of the active record.
    pub fn display_value(&self, slot: &str) -> Option<Value> {
        let raw = self.get_item_value(slot)?;
        Some(self.render_slot(self.bag_type.item(slot), raw))
    }

    /// Display values for every slot of the bag that holds a value, in
    /// schema order.
    pub fn display_values(&self) -> Vec<DisplayValue> {
        self.bag_type
            .composite_bag_items
            .iter()
            .filter_map(|item| {
                let raw = self.get_item_value(&item.name)?;
                Some(DisplayValue {
                    name: item.name.clone(),
                    value: self.render_slot(Some(item), raw),
                })
            })
            .collect()
    }

    fn render_slot(&self, item: Option<&BagItem>, raw: &Value) -> Value {
        match item.and_then(BagItem::type_ref) {
            Some(type_ref) => self.get_display_value(type_ref, raw),
            None => raw.clone(),
        }
    }

    // ================================================================
    // Messages
    // ================================================================

    /// Sends the status's candidate message and yields the turn.
    pub fn add_candidate_message(&mut self) {
        let payload = self.status.candidate_message.clone().unwrap_or(Value::Null);
        self.ctx.add_message(payload);
        self.ctx.keep_turn(false);
    }

    /// Queues an arbitrary message without touching turn control.
    pub fn add_message(&mut self, payload: Value) {
        self.ctx.add_message(payload);
    }
}
