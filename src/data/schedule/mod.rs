use chrono::NaiveDateTime;
use thiserror::Error;

use crate::data::{Product, ProductId, Step};
use crate::parsing::{reload, ResolvedTimestamp, TimeConverter};

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ScheduleErr {
    #[error("No product at row {0}")]
    NoSuchProduct(usize),
}

type ScheduleResult<T> = Result<T, ScheduleErr>;

/// The products of a session together with the shared "all done" target.
///
/// The product list always ends with exactly one blank row to type into.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Schedule {
    all_done: Option<ResolvedTimestamp>,
    products: Vec<Product>,
    next_product_id: u32,
}

impl Default for Schedule {
    fn default() -> Self {
        let mut schedule = Schedule {
            all_done: None,
            products: Vec::new(),
            next_product_id: 1,
        };
        schedule.ensure_one_blank_product();
        schedule
    }
}

impl Schedule {
    pub fn all_done(&self) -> Option<ResolvedTimestamp> {
        self.all_done
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn named_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| !p.is_blank())
    }

    pub fn find_product(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.products
            .iter()
            .position(|p| !p.is_blank() && p.name.eq_ignore_ascii_case(name))
    }

    /// Changes the shared target. Products still following the old target
    /// follow the new one.
    pub fn set_all_done(&mut self, value: Option<ResolvedTimestamp>) {
        let previous = self.all_done;
        for product in self.products.iter_mut().filter(|p| !p.is_blank()) {
            if product.done.is_none() || product.done == previous {
                product.done = value;
            }
        }
        self.all_done = value;
    }

    pub fn rename_product(&mut self, index: usize, name: &str) -> ScheduleResult<()> {
        let all_done = self.all_done;
        let product = self.product_mut(index)?;
        product.name = name.trim().to_string();
        if !product.is_blank() && product.done.is_none() {
            product.done = all_done;
        }
        self.register(index)?;
        self.ensure_one_blank_product();
        Ok(())
    }

    pub fn set_product_done(
        &mut self,
        index: usize,
        value: Option<ResolvedTimestamp>,
    ) -> ScheduleResult<()> {
        self.product_mut(index)?.done = value;
        self.register(index)?;
        Ok(())
    }

    pub fn add_step(&mut self, index: usize, step: Step) -> ScheduleResult<()> {
        self.product_mut(index)?.add_step(step);
        self.register(index)?;
        Ok(())
    }

    pub fn remove_step(&mut self, index: usize, step: usize) -> ScheduleResult<Option<Step>> {
        Ok(self.product_mut(index)?.remove_step(step))
    }

    /// Types `name` into the blank row, which turns it into a product.
    pub fn add_product(&mut self, name: &str) -> ScheduleResult<usize> {
        self.ensure_one_blank_product();
        let index = self.products.len() - 1;
        self.rename_product(index, name)?;
        Ok(index)
    }

    pub fn ensure_one_blank_product(&mut self) {
        let trailing_blank = self
            .products
            .iter()
            .rev()
            .take_while(|p| p.is_blank())
            .count();
        if trailing_blank == 0 {
            self.products.push(Product::default());
        } else {
            let keep = self.products.len() - (trailing_blank - 1);
            self.products.truncate(keep);
        }
    }

    /// Reads every stored target back through the time field, so targets
    /// that passed while the schedule was stored move to their next
    /// occurrence.
    pub fn refresh(&mut self, now: NaiveDateTime) {
        let converter = TimeConverter::default();
        let anchor = |value: Option<ResolvedTimestamp>| -> Option<ResolvedTimestamp> {
            let reloaded = reload(&converter, value.as_ref(), now);
            if let Some(e) = reloaded.error() {
                log::warn!("Dropping stored target {:?}: {}", value, e);
            }
            let refreshed = reloaded.get();
            if refreshed != value {
                log::debug!("Re-anchored {:?} to {:?}", value, refreshed);
            }
            refreshed
        };

        self.all_done = anchor(self.all_done);
        for product in &mut self.products {
            product.done = anchor(product.done);
        }
    }

    fn product_mut(&mut self, index: usize) -> ScheduleResult<&mut Product> {
        self.products
            .get_mut(index)
            .ok_or(ScheduleErr::NoSuchProduct(index))
    }

    fn register(&mut self, index: usize) -> ScheduleResult<ProductId> {
        let next = self.next_product_id;
        let product = self.product_mut(index)?;
        if let Some(id) = product.id {
            return Ok(id);
        }
        let id = ProductId(next);
        product.id = Some(id);
        log::debug!("Registered product '{}' as {}", product.name, id);
        self.next_product_id += 1;
        Ok(id)
    }
}
