use std::io::Write;

use anyhow::{bail, Context};
use chrono::NaiveDateTime;

use crate::data::{Schedule, Step};
use crate::parsing::{
    format_duration_compact, parse_duration, Conversion, ConversionError, Converter,
    DurationConverter, DurationTemplate, NameConverter, TimeConverter, TimeFormat,
};

const DISPLAY: TimeConverter = TimeConverter {
    format: TimeFormat::Display,
};

/// The value of a typed field, failing with the reason it is invalid.
/// A cleared field is `None`.
fn field<T>(text: &str, conversion: Conversion<T>) -> anyhow::Result<Option<T>> {
    match conversion.reason().filter(ConversionError::is_error) {
        Some(e) => bail!("'{}': {}", text.trim(), e),
        None => Ok(conversion.get()),
    }
}

fn print_pair(
    out: &mut impl Write,
    text: &str,
    parts: (Option<(String, String)>, Option<ConversionError>),
) -> anyhow::Result<()> {
    match parts {
        (Some((editable, display)), _) => writeln!(out, "{}\t{}", editable, display)?,
        (None, Some(e)) => bail!("'{}': {}", text.trim(), e),
        (None, None) => writeln!(out, "(cleared)")?,
    }
    Ok(())
}

pub fn print_time(out: &mut impl Write, text: &str, now: NaiveDateTime) -> anyhow::Result<()> {
    let editable = TimeConverter::default();
    let parts = editable
        .to_value(text, now)
        .map(|t| (editable.to_string(Some(&t)), DISPLAY.to_string(Some(&t))))
        .into_parts();
    print_pair(out, text, parts)
}

pub fn print_duration(
    out: &mut impl Write,
    template: &DurationTemplate,
    text: &str,
) -> anyhow::Result<()> {
    let parts = parse_duration(text)
        .map(|d| (template.render(&d), format_duration_compact(Some(&d))))
        .into_parts();
    print_pair(out, text, parts)
}

pub fn set_all_done(schedule: &mut Schedule, text: &str, now: NaiveDateTime) -> anyhow::Result<()> {
    let value = field(text, TimeConverter::default().to_value(text, now))?;
    schedule.set_all_done(value);
    Ok(())
}

/// Adds the product if it is new. A non-empty `time` replaces its target.
pub fn set_product(
    schedule: &mut Schedule,
    name: &str,
    time: &str,
    now: NaiveDateTime,
) -> anyhow::Result<usize> {
    let Some(name) = NameConverter.to_value(name, now).get() else {
        bail!("Product name must not be empty");
    };
    let index = match schedule.find_product(&name) {
        Some(index) => index,
        None => schedule.add_product(&name)?,
    };

    let done = TimeConverter::default().to_value(time, now);
    if !done.is_empty() {
        schedule.set_product_done(index, field(time, done)?)?;
    }
    Ok(index)
}

pub fn add_step(
    schedule: &mut Schedule,
    template: &DurationTemplate,
    product: &str,
    name: &str,
    duration: &str,
    now: NaiveDateTime,
) -> anyhow::Result<()> {
    let index = schedule
        .find_product(product)
        .with_context(|| format!("Unknown product '{}'", product))?;
    let Some(name) = NameConverter.to_value(name, now).get() else {
        bail!("Step name must not be empty");
    };
    let converter = DurationConverter {
        template: template.clone(),
    };
    let duration = field(duration, converter.to_value(duration, now))?;
    schedule.add_step(index, Step::new(name, duration))?;
    Ok(())
}

/// Removes the first step of `product` called `name`.
pub fn remove_step(schedule: &mut Schedule, product: &str, name: &str) -> anyhow::Result<Step> {
    let index = schedule
        .find_product(product)
        .with_context(|| format!("Unknown product '{}'", product))?;
    let name = name.trim();
    let step = schedule.products()[index]
        .steps
        .iter()
        .position(|s| s.name.eq_ignore_ascii_case(name))
        .with_context(|| format!("Unknown step '{}' of '{}'", name, product))?;
    schedule
        .remove_step(index, step)?
        .with_context(|| format!("Unknown step '{}' of '{}'", name, product))
}

pub fn print_schedule(
    out: &mut impl Write,
    schedule: &Schedule,
    template: &DurationTemplate,
) -> anyhow::Result<()> {
    let durations = DurationConverter {
        template: template.clone(),
    };
    let all_done = schedule.all_done();
    writeln!(
        out,
        "All products done @ {}",
        DISPLAY.to_string(all_done.as_ref())
    )?;

    for product in schedule.named_products() {
        writeln!(
            out,
            "{}: {} (total {})",
            product.name,
            DISPLAY.to_string(product.done.as_ref()),
            durations.to_string(Some(&product.total_duration()))
        )?;
        for (step, start) in product.step_starts() {
            let start = start
                .map(|s| TimeFormat::Display.render(&s))
                .unwrap_or_default();
            writeln!(
                out,
                "  {:<16} {} ({})",
                start,
                step.name,
                durations.to_string(step.duration.as_ref())
            )?;
        }
    }
    Ok(())
}
