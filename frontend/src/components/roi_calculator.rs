use log::debug;

use crate::dom::{Element, Page};

/// The incident rate is quoted per this many procedures.
pub const PROCEDURES_PER_RATE: f64 = 5500.0;
pub const COST_PER_INCIDENT: f64 = 200_000.0;
/// Example yearly system pricing.
pub const SYSTEM_COST: f64 = 50_000.0;
/// Inputs are clamped to this magnitude so every derived figure stays finite.
pub const INPUT_LIMIT: f64 = 1e12;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RoiInputs {
    pub procedures: f64,
    pub rsi_rate: f64,
}

impl RoiInputs {
    pub fn parse(procedures: &str, rsi_rate: &str) -> Self {
        Self {
            procedures: parse_number(procedures).clamp(-INPUT_LIMIT, INPUT_LIMIT),
            rsi_rate: parse_number(rsi_rate).clamp(-INPUT_LIMIT, INPUT_LIMIT),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoiReport {
    pub expected_cases: f64,
    pub annual_rsi_cost: f64,
    pub system_cost: f64,
    pub net_savings: f64,
    pub roi_percentage: f64,
}

impl RoiReport {
    pub fn compute(inputs: RoiInputs) -> Self {
        let expected_cases = (inputs.procedures / PROCEDURES_PER_RATE) * inputs.rsi_rate;
        let annual_rsi_cost = expected_cases * COST_PER_INCIDENT;
        let system_cost = SYSTEM_COST;
        let net_savings = annual_rsi_cost - system_cost;
        let roi_percentage = if system_cost > 0.0 {
            (net_savings / system_cost) * 100.0
        } else {
            0.0
        };

        Self {
            expected_cases,
            annual_rsi_cost,
            system_cost,
            net_savings,
            roi_percentage,
        }
    }

    pub fn display(&self) -> RoiDisplay {
        RoiDisplay {
            expected_cases: to_fixed(self.expected_cases, 2),
            annual_cost: format_usd(self.annual_rsi_cost),
            system_cost: format_usd(self.system_cost),
            net_savings: format_usd(self.net_savings),
            roi_percentage: format!("{}%", to_fixed(self.roi_percentage, 0)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoiDisplay {
    pub expected_cases: String,
    pub annual_cost: String,
    pub system_cost: String,
    pub net_savings: String,
    pub roi_percentage: String,
}

/// Reads the longest numeric prefix the way a browser's `parseFloat` does.
/// Anything that doesn't come out as a finite number reads as zero.
pub fn parse_number(raw: &str) -> f64 {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let digits_start = end;
    while bytes.get(end).map_or(false, u8::is_ascii_digit) {
        end += 1;
    }
    let mut mantissa_digits = end - digits_start;
    if bytes.get(end) == Some(&b'.') {
        let mut frac_end = end + 1;
        while bytes.get(frac_end).map_or(false, u8::is_ascii_digit) {
            frac_end += 1;
        }
        mantissa_digits += frac_end - end - 1;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return 0.0;
    }
    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).map_or(false, u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    match text[..end].parse::<f64>() {
        Ok(value) if value.is_finite() && value != 0.0 => value,
        _ => 0.0,
    }
}

/// Fixed-point rendering with ties rounded away from zero on the exact
/// binary value, which is what `Number.prototype.toFixed` does.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    if value.is_infinite() {
        return format!("{}Infinity", sign);
    }
    if value.abs() >= 1e21 {
        return exponent_form(value);
    }
    format!("{}{}", sign, round_half_up(value.abs(), digits))
}

// `toFixed` hands magnitudes from 1e21 up to the shortest exponent form.
fn exponent_form(value: f64) -> String {
    let shortest = format!("{:e}", value);
    match shortest.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => shortest,
    }
}

// `{:.N}` breaks exact ties towards even; look past the cut to catch them.
fn round_half_up(magnitude: f64, digits: usize) -> String {
    const GUARD: usize = 30;
    let exact = format!("{:.*}", digits + GUARD, magnitude);
    let (kept, rest) = exact.split_at(exact.len() - GUARD);
    let is_tie = rest.starts_with('5') && rest[1..].bytes().all(|b| b == b'0');
    if !is_tie {
        return format!("{:.*}", digits, magnitude);
    }

    let kept = kept.trim_end_matches('.');
    let mut out: Vec<u8> = kept.bytes().collect();
    let mut carry = true;
    for b in out.iter_mut().rev() {
        if !carry {
            break;
        }
        match *b {
            b'.' => continue,
            b'9' => *b = b'0',
            _ => {
                *b += 1;
                carry = false;
            }
        }
    }
    let mut rounded = String::from_utf8(out).unwrap_or_default();
    if carry {
        rounded.insert(0, '1');
    }
    rounded
}

/// US dollars, no cents, thousands grouped: `-$1,950,000`.
pub fn format_usd(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    if value.is_infinite() {
        return format!("{}$∞", sign);
    }
    let whole = round_half_up(value.abs(), 0);
    format!("{}${}", sign, group_thousands(&whole))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

struct Outputs<E> {
    expected_cases: Option<E>,
    annual_cost: Option<E>,
    system_cost: Option<E>,
    net_savings: Option<E>,
    roi_percentage: Option<E>,
}

pub struct RoiCalculator<E> {
    procedures: E,
    rsi_rate: E,
    outputs: Outputs<E>,
}

impl<E: Element> RoiCalculator<E> {
    /// `None` when either input is missing from the page.
    pub fn mount<P: Page<Element = E>>(page: &P) -> Option<Self> {
        let procedures = page.by_id("procedures")?;
        let rsi_rate = page.by_id("rsi-rate")?;
        Some(Self {
            procedures,
            rsi_rate,
            outputs: Outputs {
                expected_cases: page.by_id("expected-cases"),
                annual_cost: page.by_id("annual-cost"),
                system_cost: page.by_id("system-cost"),
                net_savings: page.by_id("net-savings"),
                roi_percentage: page.by_id("roi-percentage"),
            },
        })
    }

    pub fn inputs(&self) -> [&E; 2] {
        [&self.procedures, &self.rsi_rate]
    }

    pub fn recalculate(&self) -> RoiReport {
        let inputs = RoiInputs::parse(&self.procedures.value(), &self.rsi_rate.value());
        let report = RoiReport::compute(inputs);
        let display = report.display();
        debug!("roi recalculated for {:?}: {:?}", inputs, display);

        let writes = [
            (&self.outputs.expected_cases, &display.expected_cases),
            (&self.outputs.annual_cost, &display.annual_cost),
            (&self.outputs.system_cost, &display.system_cost),
            (&self.outputs.net_savings, &display.net_savings),
            (&self.outputs.roi_percentage, &display.roi_percentage),
        ];
        for (slot, text) in writes {
            if let Some(el) = slot {
                el.set_text(text);
            }
        }
        report
    }
}
