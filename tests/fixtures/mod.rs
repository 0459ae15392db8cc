#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::path::Path;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Duration;

use gallery_manifest::config::{Config, SourceConfig};
use gallery_manifest::enrich::Sleeper;
use gallery_manifest::error::{ListingError, ScorerError};
use gallery_manifest::listing::AssetProvider;
use gallery_manifest::model::AssetRecord;
use gallery_manifest::scoring::{LocalClassifier, Prediction, VisionRequest, VisionScorer};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};

pub fn asset(id: &str, name: &str, modified_time: &str) -> AssetRecord {
    AssetRecord {
        id: id.to_string(),
        name: name.to_string(),
        mime_type: "image/png".to_string(),
        created_time: "2022-07-10T12:00:00.000Z".to_string(),
        modified_time: modified_time.to_string(),
        path: "Album".to_string(),
        src: format!("https://images.test/{id}"),
        view: Some(format!("https://drive.test/view/{id}")),
    }
}

pub fn png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img = ImageBuffer::from_pixel(width, height, Rgb(color));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// Config for a run writing to `output` with no scorers configured.
pub fn config(output: &Path) -> Config {
    let mut config = Config::new(SourceConfig::Local {
        root: output.parent().unwrap().to_path_buf(),
    });
    config.output_path = output.to_path_buf();
    config
}

/// In-memory asset tree. Assets without bytes fail to download.
#[derive(Default)]
pub struct FakeProvider {
    assets: Vec<AssetRecord>,
    bytes: HashMap<String, Vec<u8>>,
    fetches: RefCell<Vec<String>>,
    fail_listing: bool,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, asset: AssetRecord, bytes: Vec<u8>) -> Self {
        self.bytes.insert(asset.id.clone(), bytes);
        self.assets.push(asset);
        self
    }

    pub fn with_missing(mut self, asset: AssetRecord) -> Self {
        self.assets.push(asset);
        self
    }

    pub fn failing() -> Self {
        Self {
            fail_listing: true,
            ..Self::default()
        }
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetches.borrow().clone()
    }
}

impl AssetProvider for FakeProvider {
    fn list(&self) -> Result<Vec<AssetRecord>, ListingError> {
        if self.fail_listing {
            return Err(ListingError::invalid_response("listing unavailable"));
        }
        Ok(self.assets.clone())
    }

    fn fetch(&self, asset: &AssetRecord) -> Result<Vec<u8>, ListingError> {
        self.fetches.borrow_mut().push(asset.id.clone());
        self.bytes
            .get(&asset.id)
            .cloned()
            .ok_or_else(|| ListingError::invalid_response(format!("no content for {}", asset.id)))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Vision scorer replaying a script of replies; an exhausted script is
/// reported as an unavailable service.
pub struct FakeScorer {
    script: RefCell<VecDeque<Result<String, ScorerError>>>,
    calls: Rc<Cell<usize>>,
}

impl FakeScorer {
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Result<String, ScorerError>>,
    {
        Self {
            script: RefCell::new(script.into_iter().collect()),
            calls: Rc::new(Cell::new(0)),
        }
    }

    pub fn calls(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.calls)
    }
}

impl VisionScorer for FakeScorer {
    fn name(&self) -> &'static str {
        "fake-vision"
    }

    fn score(&self, _request: &VisionRequest<'_>) -> Result<String, ScorerError> {
        self.calls.set(self.calls.get() + 1);
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ScorerError::unavailable("script exhausted")))
    }
}

pub struct FakeClassifier(pub Vec<Prediction>);

impl LocalClassifier for FakeClassifier {
    fn classify(&self, _image: &DynamicImage) -> Result<Vec<Prediction>, ScorerError> {
        Ok(self.0.clone())
    }
}

/// Records requested waits instead of sleeping.
#[derive(Default)]
pub struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}
