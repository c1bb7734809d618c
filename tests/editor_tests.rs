use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Result, anyhow};
use image::{Rgba, RgbaImage};
use rust_meme_frame::editor::{Control, Editor};
use rust_meme_frame::error::Error;
use rust_meme_frame::events::{Captions, EventOutcome, UiEvent};
use rust_meme_frame::fit::FitError;
use rust_meme_frame::render::surface::Surface;
use rust_meme_frame::render::text::TextOverlay;
use rust_meme_frame::speech::{SpeechSynth, Utterance, Voice};
use rust_meme_frame::volume::VolumeLevel;

/// Paints a marker pixel instead of rasterizing glyphs.
#[derive(Default, Clone)]
struct MarkerOverlay {
    drawn: Rc<RefCell<Vec<Captions>>>,
}

impl TextOverlay for MarkerOverlay {
    fn draw(&self, surface: &mut Surface, captions: &Captions) -> Result<()> {
        surface
            .image_mut()
            .put_pixel(200, 50, Rgba([255, 255, 255, 255]));
        self.drawn.borrow_mut().push(captions.clone());
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSynth {
    voices: Vec<Voice>,
    spoken: Vec<Utterance>,
    fail: bool,
}

impl SpeechSynth for RecordingSynth {
    fn voices(&self) -> Result<Vec<Voice>> {
        Ok(self.voices.clone())
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<()> {
        if self.fail {
            return Err(anyhow!("audio device busy"));
        }
        self.spoken.push(utterance.clone());
        Ok(())
    }
}

fn voice(name: &str, lang: &str, default: bool) -> Voice {
    Voice {
        name: name.into(),
        lang: lang.into(),
        default,
    }
}

fn editor() -> (Editor<MarkerOverlay, RecordingSynth>, MarkerOverlay) {
    let overlay = MarkerOverlay::default();
    let synth = RecordingSynth {
        voices: vec![voice("Alice", "en-GB", true), voice("Bob", "en-US", false)],
        ..Default::default()
    };
    let editor = Editor::new(Surface::new(400, 400, [0, 0, 0]), overlay.clone(), synth);
    (editor, overlay)
}

fn captions(top: &str, bottom: &str) -> Captions {
    Captions {
        top: top.into(),
        bottom: bottom.into(),
    }
}

fn wide_image() -> RgbaImage {
    RgbaImage::from_pixel(800, 200, Rgba([0, 0, 255, 255]))
}

#[test]
fn starts_with_everything_disabled() {
    let (editor, _) = editor();
    let controls = editor.controls();
    assert!(!controls.generate && !controls.clear && !controls.read_text);
    assert!(!controls.voice_select);
    assert_eq!(editor.voices().labels().len(), 1);
}

#[test]
fn selecting_image_enables_generate_and_letterboxes() {
    let (mut editor, _) = editor();
    let outcome = editor.dispatch(UiEvent::ImageSelected(wide_image())).unwrap();
    let EventOutcome::ImagePlaced(placement) = outcome else {
        panic!("unexpected outcome {outcome:?}");
    };
    assert_eq!(placement.offset_y, 150.0);

    let controls = editor.controls();
    assert!(controls.generate && !controls.clear && !controls.read_text);
    let img = editor.surface().image();
    assert_eq!(*img.get_pixel(200, 20), Rgba([0, 0, 0, 255]));
    assert!(img.get_pixel(200, 200)[2] > 240);
}

#[test]
fn degenerate_image_is_rejected_without_enabling_controls() {
    let (mut editor, _) = editor();
    let err = editor
        .dispatch(UiEvent::ImageSelected(RgbaImage::new(100, 0)))
        .unwrap_err();
    assert!(matches!(err, Error::Fit(FitError::DegenerateContent { .. })));
    assert!(!editor.controls().generate);
}

#[test]
fn submit_draws_captions_and_flips_controls() {
    let (mut editor, overlay) = editor();
    editor.dispatch(UiEvent::ImageSelected(wide_image())).unwrap();
    editor
        .dispatch(UiEvent::FormSubmitted(captions("one does not", "simply")))
        .unwrap();

    assert_eq!(overlay.drawn.borrow().as_slice(), &[captions("one does not", "simply")]);
    assert_eq!(
        *editor.surface().image().get_pixel(200, 50),
        Rgba([255, 255, 255, 255])
    );
    let controls = editor.controls();
    assert!(!controls.generate && controls.clear && controls.read_text);
}

#[test]
fn submit_before_image_is_rejected() {
    let (mut editor, overlay) = editor();
    let err = editor.form_submitted(captions("a", "b")).unwrap_err();
    assert!(matches!(err, Error::ControlDisabled(Control::Generate)));
    assert!(overlay.drawn.borrow().is_empty());
}

#[test]
fn second_submit_needs_reset() {
    let (mut editor, _) = editor();
    editor.image_selected(wide_image()).unwrap();
    editor.form_submitted(captions("a", "b")).unwrap();
    let err = editor.form_submitted(captions("c", "d")).unwrap_err();
    assert!(matches!(err, Error::ControlDisabled(Control::Generate)));
}

#[test]
fn reset_clears_surface_and_form() {
    let (mut editor, _) = editor();
    editor.image_selected(wide_image()).unwrap();
    editor.form_submitted(captions("a", "b")).unwrap();
    editor.dispatch(UiEvent::ResetClicked).unwrap();

    assert_eq!(editor.captions(), &Captions::default());
    assert!(editor.surface().image().pixels().all(|px| px[3] == 0));
    let controls = editor.controls();
    assert!(controls.generate && !controls.clear && !controls.read_text);

    let err = editor.reset_clicked().unwrap_err();
    assert!(matches!(err, Error::ControlDisabled(Control::Clear)));
}

#[test]
fn speak_reads_top_then_bottom_with_voice_and_gain() {
    let (mut editor, _) = editor();
    editor.dispatch(UiEvent::VoicesChanged).unwrap();
    editor.image_selected(wide_image()).unwrap();
    editor.form_submitted(captions("top text", "bottom text")).unwrap();
    editor.dispatch(UiEvent::VolumeChanged(25)).unwrap();
    editor.dispatch(UiEvent::VoiceSelected("Bob".into())).unwrap();

    let outcome = editor.dispatch(UiEvent::SpeakRequested).unwrap();
    assert_eq!(outcome, EventOutcome::Spoken(2));

    let spoken = &editor.synth().spoken;
    assert_eq!(spoken.len(), 2);
    assert_eq!(spoken[0].text, "top text");
    assert_eq!(spoken[1].text, "bottom text");
    for utterance in spoken {
        assert_eq!(utterance.voice.as_ref().map(|v| v.name.as_str()), Some("Bob"));
        assert!((utterance.volume - 0.25).abs() < f32::EPSILON);
    }
}

#[test]
fn unknown_voice_falls_back_to_backend_default() {
    let (mut editor, _) = editor();
    editor.image_selected(wide_image()).unwrap();
    editor.form_submitted(captions("a", "b")).unwrap();
    editor.voice_selected("Nobody".into());
    editor.speak_requested().unwrap();
    assert!(editor.synth().spoken.iter().all(|u| u.voice.is_none()));
    assert!(editor.synth().spoken.iter().all(|u| u.volume == 1.0));
}

#[test]
fn speak_requires_captions() {
    let (mut editor, _) = editor();
    editor.image_selected(wide_image()).unwrap();
    let err = editor.speak_requested().unwrap_err();
    assert!(matches!(err, Error::ControlDisabled(Control::ReadText)));
    assert!(editor.synth().spoken.is_empty());
}

#[test]
fn speech_failure_is_reported() {
    let overlay = MarkerOverlay::default();
    let synth = RecordingSynth {
        fail: true,
        ..Default::default()
    };
    let mut editor = Editor::new(Surface::new(400, 400, [0, 0, 0]), overlay, synth);
    editor.image_selected(wide_image()).unwrap();
    editor.form_submitted(captions("a", "b")).unwrap();
    assert!(matches!(editor.speak_requested(), Err(Error::Speech(_))));
}

#[test]
fn volume_change_reports_icon_tier() {
    let (mut editor, _) = editor();
    let cases = [
        (0, VolumeLevel::Muted),
        (33, VolumeLevel::Low),
        (66, VolumeLevel::Medium),
        (67, VolumeLevel::High),
    ];
    for (value, level) in cases {
        assert_eq!(
            editor.dispatch(UiEvent::VolumeChanged(value)).unwrap(),
            EventOutcome::VolumeLevel(level)
        );
    }
    assert!(matches!(
        editor.volume_changed(101),
        Err(Error::InvalidVolume(101))
    ));
    assert_eq!(editor.volume().value(), 67);
}

#[test]
fn voices_changed_populates_catalog() {
    let (mut editor, _) = editor();
    let outcome = editor.dispatch(UiEvent::VoicesChanged).unwrap();
    assert_eq!(
        outcome,
        EventOutcome::VoicesListed(vec![
            "Alice (en-GB) -- DEFAULT".to_string(),
            "Bob (en-US)".to_string(),
        ])
    );
    assert!(editor.controls().voice_select);
    assert!(editor.voices().find("Alice").is_some());
}
