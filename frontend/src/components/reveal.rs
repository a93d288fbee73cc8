use std::ops::ControlFlow;

use log::debug;
use serde::Deserialize;

use crate::dom::{Element, IntersectionEntry, Observer, ObserverOptions};
use crate::timers::Timers;

pub const CARD_SELECTOR: &str =
    ".problem-card, .feature-card, .testimonial-card, .tech-item, .solution-text, .solution-visual";
pub const FADE_IN_UP_CLASS: &str = "fade-in-up";

pub const CARD_OPTIONS: ObserverOptions = ObserverOptions::new(0.1).with_root_margin("0px 0px -50px 0px");
pub const SECTION_OPTIONS: ObserverOptions = ObserverOptions::new(0.5);

pub const COUNTER_TICK_MS: u32 = 16;
pub const COUNTER_DURATION_MS: u32 = 2000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealState {
    Unseen,
    Revealed,
}

/// Elements that each get `effect` applied the first time they intersect,
/// and are unobserved right after.
pub struct RevealGroup<E> {
    targets: Vec<(E, RevealState)>,
    effect: Box<dyn Fn(&E)>,
}

impl<E: Element> RevealGroup<E> {
    pub fn new(targets: Vec<E>, effect: impl Fn(&E) + 'static) -> Self {
        Self {
            targets: targets.into_iter().map(|t| (t, RevealState::Unseen)).collect(),
            effect: Box::new(effect),
        }
    }

    pub fn targets(&self) -> impl Iterator<Item = &E> {
        self.targets.iter().map(|(el, _)| el)
    }

    pub fn state_of(&self, target: &E) -> Option<RevealState> {
        self.targets.iter().find(|(el, _)| el == target).map(|(_, s)| *s)
    }

    /// Returns how many targets were revealed by this batch.
    pub fn handle(&mut self, entries: Vec<IntersectionEntry<E>>, observer: &impl Observer<E>) -> usize {
        let mut revealed = 0;
        for entry in entries.into_iter().filter(|e| e.is_intersecting) {
            let Some((target, state)) = self.targets.iter_mut().find(|(el, _)| *el == entry.target) else {
                continue;
            };
            if *state == RevealState::Revealed {
                continue;
            }
            *state = RevealState::Revealed;
            (self.effect)(target);
            observer.unobserve(target);
            revealed += 1;
        }
        revealed
    }
}

/// One visual step of a staggered pop-in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stagger {
    pub step_ms: u32,
    pub settle_ms: u32,
    pub hidden_transform: &'static str,
    pub shown_transform: &'static str,
    pub transition: &'static str,
}

pub const INSTRUMENT_STAGGER: Stagger = Stagger {
    step_ms: 200,
    settle_ms: 100,
    hidden_transform: "translateX(-20px)",
    shown_transform: "translateX(0)",
    transition: "all 0.5s ease",
};

pub const STAT_STAGGER: Stagger = Stagger {
    step_ms: 200,
    settle_ms: 100,
    hidden_transform: "translateY(20px)",
    shown_transform: "translateY(0)",
    transition: "all 0.6s ease",
};

impl Stagger {
    /// Hides item `i` at `i * step`, then brings it back in `settle` later.
    pub fn play<E: Element, T: Timers>(&self, items: &[E], timers: &T) {
        for (index, item) in items.iter().enumerate() {
            let item = item.clone();
            let stagger = *self;
            let later = timers.clone();
            timers.after(
                stagger.step_ms * index as u32,
                Box::new(move || {
                    item.set_style("opacity", "0");
                    item.set_style("transform", stagger.hidden_transform);
                    later.after(
                        stagger.settle_ms,
                        Box::new(move || {
                            item.set_style("transition", stagger.transition);
                            item.set_style("opacity", "1");
                            item.set_style("transform", stagger.shown_transform);
                        }),
                    );
                }),
            );
        }
    }
}

/// How the hero statistics are brought in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatsEffect {
    #[default]
    Fade,
    CountUp,
}

/// Values a linear count-up shows, one per tick; the last one is exactly `target`.
#[derive(Clone, Debug)]
pub struct CountUp {
    target: f64,
    increment: f64,
    current: f64,
    finished: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Frame {
    Partial(f64),
    Final(f64),
}

impl CountUp {
    pub fn new(target: f64, duration_ms: u32) -> Self {
        let ticks = f64::from(duration_ms) / f64::from(COUNTER_TICK_MS);
        Self { target, increment: target / ticks, current: 0.0, finished: false }
    }
}

impl Iterator for CountUp {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.finished {
            return None;
        }
        self.current += self.increment;
        // a non-advancing increment would never get there
        if self.current >= self.target || !(self.increment > 0.0) {
            self.finished = true;
            Some(Frame::Final(self.target))
        } else {
            Some(Frame::Partial(self.current.floor()))
        }
    }
}

/// Counts `element` up from zero to `target`, one frame every 16ms.
pub fn animate_counter<E: Element, T: Timers>(
    element: E,
    target: f64,
    duration_ms: u32,
    timers: &T,
    render: impl Fn(Frame) -> String + 'static,
) {
    let mut frames = CountUp::new(target, duration_ms);
    timers.every(
        COUNTER_TICK_MS,
        Box::new(move || match frames.next() {
            Some(frame) => {
                element.set_text(&render(frame));
                match frame {
                    Frame::Final(_) => ControlFlow::Break(()),
                    Frame::Partial(_) => ControlFlow::Continue(()),
                }
            }
            None => ControlFlow::Break(()),
        }),
    );
}

/// A pre-formatted statistic such as `$200K` split around its number.
#[derive(Clone, Debug, PartialEq)]
pub struct StatFigure {
    pub prefix: String,
    pub value: f64,
    pub decimals: usize,
    pub grouped: bool,
    pub suffix: String,
}

impl StatFigure {
    pub fn parse(text: &str) -> Option<Self> {
        let start = text.find(|c: char| c.is_ascii_digit())?;
        let body_len = text[start..]
            .find(|c: char| !(c.is_ascii_digit() || c == ',' || c == '.'))
            .unwrap_or(text.len() - start);
        let body = text[start..start + body_len].trim_end_matches(|c: char| c == ',' || c == '.');
        let digits: String = body.chars().filter(|c| *c != ',').collect();
        let value = digits.parse::<f64>().ok()?;

        Some(Self {
            prefix: text[..start].to_string(),
            value,
            decimals: digits.split_once('.').map_or(0, |(_, frac)| frac.len()),
            grouped: body.contains(','),
            suffix: text[start + body.len()..].to_string(),
        })
    }

    pub fn render(&self, value: f64) -> String {
        let number = format!("{:.*}", self.decimals, value);
        let number = if self.grouped { group_integer_part(&number) } else { number };
        format!("{}{}{}", self.prefix, number, self.suffix)
    }
}

fn group_integer_part(number: &str) -> String {
    let (int, frac) = match number.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (number, None),
    };
    let mut grouped = String::new();
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    match frac {
        Some(frac) => format!("{}.{}", grouped, frac),
        None => grouped,
    }
}

/// Brings the hero statistics in, either by the staggered fade or by counting up.
pub fn play_hero_stats<E: Element, T: Timers>(stats: &[E], effect: StatsEffect, timers: &T) {
    match effect {
        StatsEffect::Fade => STAT_STAGGER.play(stats, timers),
        StatsEffect::CountUp => {
            for stat in stats {
                let literal = stat.text();
                let Some(figure) = StatFigure::parse(&literal) else {
                    debug!("stat {:?} has no number to count", literal);
                    continue;
                };
                animate_counter(stat.clone(), figure.value, COUNTER_DURATION_MS, timers, move |frame| match frame {
                    Frame::Partial(v) => figure.render(v),
                    Frame::Final(_) => literal.clone(),
                });
            }
        }
    }
}
