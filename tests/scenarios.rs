use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ply_layout::engine::Settings;
use ply_layout::errors::ErrorType;
use ply_layout::prelude::*;

fn ply(width: f32, height: f32) -> Ply {
    let mut ply = Ply::new(Dimensions::new(width, height));
    ply.set_measure_text_function(|text, _| Dimensions::new(text.len() as f32 * 10.0, 20.0));
    ply
}

#[test]
fn fixed_element_yields_one_rectangle() {
    let mut ply = ply(800.0, 600.0);
    let mut ui = ply.begin();
    ui.element()
        .width(fixed!(100.0))
        .height(fixed!(50.0))
        .background_color(Color::rgb(200.0, 0.0, 0.0))
        .empty();
    let commands = ui.end();

    assert_eq!(commands.len(), 1);
    match &commands[0].config {
        RenderCommandConfig::Rectangle(rect) => {
            assert_eq!(rect.color, Color::rgb(200.0, 0.0, 0.0))
        }
        _ => panic!("Expected Rectangle config"),
    }
    assert_eq!(
        commands[0].bounding_box,
        BoundingBox::new(0.0, 0.0, 100.0, 50.0)
    );
}

#[test]
fn grow_children_split_remaining_space() {
    let mut ply = ply(800.0, 600.0);
    let mut ui = ply.begin();
    ui.element()
        .id("Row")
        .width(fixed!(200.0))
        .height(fixed!(40.0))
        .layout(|l| l.padding(Padding::horizontal(16)).gap(16))
        .children(|ui| {
            ui.element().id("Left").width(grow!()).height(grow!()).empty();
            ui.element().id("Right").width(grow!()).height(grow!()).empty();
        });
    ui.end();

    let left = ply.bounding_box("Left").unwrap_or_default();
    let right = ply.bounding_box("Right").unwrap_or_default();
    assert_eq!(left, BoundingBox::new(16.0, 0.0, 76.0, 40.0));
    assert_eq!(right, BoundingBox::new(108.0, 0.0, 76.0, 40.0));
}

#[test]
fn short_text_stays_on_one_line() {
    let mut ply = ply(800.0, 600.0);
    let mut ui = ply.begin();
    ui.element().width(fixed!(100.0)).children(|ui| {
        ui.text("Hello", |t| t.wrap_mode(WrapMode::Words));
    });
    let commands = ui.end();

    let lines: Vec<_> = commands
        .iter()
        .filter(|command| command.command_type() == RenderCommandType::Text)
        .collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].bounding_box.width, 50.0);
    assert_eq!(lines[0].bounding_box.height, 20.0);
}

#[test]
fn percent_child_takes_share_of_parent() {
    let mut ply = ply(800.0, 600.0);
    let mut ui = ply.begin();
    ui.element()
        .width(fixed!(400.0))
        .height(fixed!(100.0))
        .children(|ui| {
            ui.element()
                .id("Half")
                .width(Sizing::Percent(0.5))
                .height(fixed!(10.0))
                .empty();
        });
    ui.end();

    assert_eq!(
        ply.bounding_box("Half").map(|bounding_box| bounding_box.width),
        Some(200.0)
    );
}

#[test]
fn element_capacity_is_reported_once_and_first_elements_survive() {
    const CAPACITY: usize = 10;
    let mut ply = Ply::<()>::with_settings(
        Dimensions::new(800.0, 600.0),
        Settings {
            max_element_count: CAPACITY,
            ..Default::default()
        },
    );
    let errors = Rc::new(RefCell::new(Vec::new()));
    let sink = errors.clone();
    ply.set_error_handler(move |error| sink.borrow_mut().push(error.type_));

    let mut ui = ply.begin();
    for i in 0..CAPACITY as u32 + 5 {
        ui.element()
            .id(("Cell", i))
            .width(fixed!(10.0))
            .height(fixed!(10.0))
            .background_color(Color::rgb(0.0, 0.0, 255.0))
            .empty();
    }
    let commands = ui.end();

    assert_eq!(commands.len(), CAPACITY);
    assert_eq!(*errors.borrow(), vec![ErrorType::ElementsCapacityExceeded]);
    assert_eq!(
        ply.bounding_box(("Cell", CAPACITY as u32 - 1)),
        Some(BoundingBox::new(90.0, 0.0, 10.0, 10.0))
    );
    assert_eq!(ply.bounding_box(("Cell", CAPACITY as u32)), None);
}

#[test]
fn measured_text_is_cached_across_frames() {
    let calls = Rc::new(Cell::new(0usize));
    let counter = calls.clone();
    let mut ply = Ply::<()>::new(Dimensions::new(800.0, 600.0));
    ply.set_measure_text_function(move |text, _| {
        counter.set(counter.get() + 1);
        Dimensions::new(text.len() as f32 * 10.0, 20.0)
    });

    let frame = |ply: &mut Ply| {
        let mut ui = ply.begin();
        ui.text("cached words here", |t| t.font_size(16));
        ui.end().len()
    };

    assert_eq!(frame(&mut ply), 1);
    let first = calls.get();
    assert!(first > 0);
    assert_eq!(frame(&mut ply), 1);
    assert_eq!(calls.get(), first);
}

#[test]
fn text_unused_for_three_frames_is_measured_again() {
    let alpha_calls = Rc::new(Cell::new(0usize));
    let counter = alpha_calls.clone();
    // A 32 word pool leaves a single bucket, so every lookup walks every entry.
    let mut ply = Ply::<()>::with_settings(
        Dimensions::new(800.0, 600.0),
        Settings {
            max_measure_text_cache_word_count: 32,
            ..Default::default()
        },
    );
    ply.set_measure_text_function(move |text, _| {
        if text == "alpha" {
            counter.set(counter.get() + 1);
        }
        Dimensions::new(text.len() as f32 * 10.0, 20.0)
    });

    let frame = |ply: &mut Ply, text: &'static str| {
        let mut ui = ply.begin();
        ui.text(text, |t| t);
        ui.end().len()
    };

    // Static text is keyed by address, so reuse one literal.
    let alpha: &'static str = "alpha";
    assert_eq!(frame(&mut ply, alpha), 1);
    assert_eq!(frame(&mut ply, alpha), 1);
    assert_eq!(alpha_calls.get(), 1);

    for _ in 0..3 {
        frame(&mut ply, "beta");
    }
    assert_eq!(alpha_calls.get(), 1);

    assert_eq!(frame(&mut ply, alpha), 1);
    assert_eq!(alpha_calls.get(), 2);
}

#[test]
fn changing_the_text_config_measures_again() {
    let calls = Rc::new(Cell::new(0usize));
    let counter = calls.clone();
    let mut ply = Ply::<()>::new(Dimensions::new(800.0, 600.0));
    ply.set_measure_text_function(move |text, config| {
        counter.set(counter.get() + 1);
        Dimensions::new(text.len() as f32 * config.font_size as f32, 20.0)
    });

    let mut ui = ply.begin();
    ui.text("size", |t| t.font_size(10));
    ui.end();
    let first = calls.get();

    let mut ui = ply.begin();
    ui.text("size", |t| t.font_size(12));
    let commands = ui.end();
    assert!(calls.get() > first);
    assert_eq!(commands[0].bounding_box.width, 48.0);
}

#[test]
fn ids_are_stable_between_frames() {
    let mut ply = ply(800.0, 600.0);
    let mut ids = Vec::new();
    for _ in 0..2 {
        let mut ui = ply.begin();
        ui.element().width(fixed!(10.0)).height(fixed!(10.0)).children(|ui| {
            ui.element()
                .width(fixed!(5.0))
                .height(fixed!(5.0))
                .background_color(Color::rgb(1.0, 1.0, 1.0))
                .empty();
        });
        ids.push(ui.end()[0].id);
    }
    assert_eq!(ids[0], ids[1]);
    assert_ne!(ids[0], 0);
}

#[test]
fn clipped_floating_root_is_bracketed_by_scissors() {
    let mut ply = ply(800.0, 600.0);
    let mut ui = ply.begin();
    ui.element()
        .id("Viewport")
        .width(fixed!(200.0))
        .height(fixed!(100.0))
        .scroll(false, true)
        .children(|ui| {
            ui.element()
                .id("Badge")
                .width(fixed!(20.0))
                .height(fixed!(20.0))
                .background_color(Color::rgb(0.0, 255.0, 0.0))
                .floating(|f| f.clip_by_parent().z_index(2))
                .empty();
        });
    let types: Vec<_> = ui.end().iter().map(|command| command.command_type()).collect();

    assert_eq!(
        types,
        vec![
            RenderCommandType::ScissorStart,
            RenderCommandType::ScissorEnd,
            RenderCommandType::ScissorStart,
            RenderCommandType::Rectangle,
            RenderCommandType::ScissorEnd,
        ]
    );
}
