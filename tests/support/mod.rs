//! In-memory containers for exercising the remux engine without FFmpeg I/O.

#![allow(dead_code)]

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use retime::{
    Demuxer, IoStage, MediaKind, Muxer, Packet, RetimeError, StreamDescriptor, TimeBase,
};

/// Stand-in for codec parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeParameters {
    pub codec: &'static str,
    pub codec_tag: u32,
    pub unsupported: bool,
}

impl FakeParameters {
    pub fn new(codec: &'static str) -> Self {
        Self {
            codec,
            codec_tag: 0x3134_7668,
            unsupported: false,
        }
    }

    pub fn unsupported(codec: &'static str) -> Self {
        Self {
            unsupported: true,
            ..Self::new(codec)
        }
    }
}

pub fn stream(
    index: usize,
    kind: MediaKind,
    time_base: TimeBase,
    parameters: FakeParameters,
) -> StreamDescriptor<FakeParameters> {
    StreamDescriptor {
        index,
        kind,
        time_base,
        parameters,
    }
}

pub fn video(index: usize, time_base: TimeBase) -> StreamDescriptor<FakeParameters> {
    stream(index, MediaKind::Video, time_base, FakeParameters::new("h264"))
}

pub fn audio(index: usize, time_base: TimeBase) -> StreamDescriptor<FakeParameters> {
    stream(index, MediaKind::Audio, time_base, FakeParameters::new("aac"))
}

/// A packet whose payload is an identifier for later lookup.
pub fn packet(stream_index: usize, pts: i64, dts: i64) -> Packet<u32> {
    Packet {
        stream_index,
        pts: Some(pts),
        dts: Some(dts),
        duration: 0,
        position: Some(1_024),
        size: 188,
        payload: 0,
    }
}

// ── Source ─────────────────────────────────────────────────────────

pub struct FakeSource {
    streams: Vec<StreamDescriptor<FakeParameters>>,
    script: VecDeque<Result<Packet<u32>, RetimeError>>,
    released: Rc<RefCell<bool>>,
}

impl FakeSource {
    pub fn new(streams: Vec<StreamDescriptor<FakeParameters>>) -> Self {
        Self {
            streams,
            script: VecDeque::new(),
            released: Rc::new(RefCell::new(false)),
        }
    }

    #[must_use]
    pub fn with_packets(mut self, packets: impl IntoIterator<Item = Packet<u32>>) -> Self {
        for (id, mut packet) in packets.into_iter().enumerate() {
            packet.payload = id as u32;
            self.script.push_back(Ok(packet));
        }
        self
    }

    #[must_use]
    pub fn then_fail(mut self) -> Self {
        self.script.push_back(Err(RetimeError::Io {
            stage: IoStage::ReadPacket,
            code: Some(-5),
            reason: "Input/output error".to_string(),
        }));
        self
    }

    pub fn released_flag(&self) -> Rc<RefCell<bool>> {
        Rc::clone(&self.released)
    }
}

impl Drop for FakeSource {
    fn drop(&mut self) {
        *self.released.borrow_mut() = true;
    }
}

impl Demuxer for FakeSource {
    type Parameters = FakeParameters;
    type Payload = u32;

    fn streams(&self) -> Vec<StreamDescriptor<FakeParameters>> {
        self.streams.clone()
    }

    fn read_packet(&mut self) -> Result<Option<Packet<u32>>, RetimeError> {
        self.script.pop_front().transpose()
    }
}

// ── Destination ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct FakeStream {
    pub parameters: Option<FakeParameters>,
    pub time_base: TimeBase,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Open,
    Header,
    Write(Packet<u32>),
    Trailer,
}

#[derive(Debug, Default)]
pub struct DestinationLog {
    pub streams: Vec<FakeStream>,
    pub events: Vec<Event>,
    pub released: bool,
}

impl DestinationLog {
    pub fn written(&self) -> Vec<Packet<u32>> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Write(packet) => Some(packet.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Event) -> usize {
        self.events.iter().filter(|event| *event == wanted).count()
    }
}

pub struct FakeDestination {
    log: Rc<RefCell<DestinationLog>>,
    time_base: TimeBase,
    header_time_base: Option<TimeBase>,
    fail_open: bool,
    fail_header: bool,
    fail_write_at: Option<usize>,
    fail_trailer: bool,
}

impl FakeDestination {
    pub fn new(time_base: TimeBase) -> Self {
        Self {
            log: Rc::new(RefCell::new(DestinationLog::default())),
            time_base,
            header_time_base: None,
            fail_open: false,
            fail_header: false,
            fail_write_at: None,
            fail_trailer: false,
        }
    }

    /// Start with `count` streams already defined.
    #[must_use]
    pub fn with_existing_streams(self, count: usize) -> Self {
        for _ in 0..count {
            self.log.borrow_mut().streams.push(FakeStream {
                parameters: Some(FakeParameters::new("existing")),
                time_base: self.time_base,
            });
        }
        self
    }

    /// Switch every stream to `time_base` when the header is written.
    #[must_use]
    pub fn settle_time_base_on_header(mut self, time_base: TimeBase) -> Self {
        self.header_time_base = Some(time_base);
        self
    }

    #[must_use]
    pub fn fail_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    #[must_use]
    pub fn fail_header(mut self) -> Self {
        self.fail_header = true;
        self
    }

    /// Fail the `n`th packet write (0-based).
    #[must_use]
    pub fn fail_write_at(mut self, n: usize) -> Self {
        self.fail_write_at = Some(n);
        self
    }

    #[must_use]
    pub fn fail_trailer(mut self) -> Self {
        self.fail_trailer = true;
        self
    }

    pub fn log(&self) -> Rc<RefCell<DestinationLog>> {
        Rc::clone(&self.log)
    }

    fn io_error(stage: IoStage) -> RetimeError {
        RetimeError::Io {
            stage,
            code: Some(-28),
            reason: "No space left on device".to_string(),
        }
    }
}

impl Drop for FakeDestination {
    fn drop(&mut self) {
        self.log.borrow_mut().released = true;
    }
}

impl Muxer for FakeDestination {
    type Parameters = FakeParameters;
    type Payload = u32;

    fn stream_count(&self) -> usize {
        self.log.borrow().streams.len()
    }

    fn stream_time_base(&self, index: usize) -> Option<TimeBase> {
        self.log.borrow().streams.get(index).map(|stream| stream.time_base)
    }

    fn new_stream(&mut self) -> Result<usize, RetimeError> {
        let mut log = self.log.borrow_mut();
        log.streams.push(FakeStream {
            parameters: None,
            time_base: self.time_base,
        });
        Ok(log.streams.len() - 1)
    }

    fn copy_codec_parameters(
        &mut self,
        index: usize,
        parameters: &FakeParameters,
    ) -> Result<(), RetimeError> {
        if parameters.unsupported {
            return Err(RetimeError::Mapping {
                stream: index,
                reason: format!("unsupported codec {}", parameters.codec),
            });
        }
        self.log.borrow_mut().streams[index].parameters = Some(parameters.clone());
        Ok(())
    }

    fn clear_codec_tag(&mut self, index: usize) {
        if let Some(parameters) = self.log.borrow_mut().streams[index].parameters.as_mut() {
            parameters.codec_tag = 0;
        }
    }

    fn open_for_write(&mut self) -> Result<(), RetimeError> {
        if self.fail_open {
            return Err(Self::io_error(IoStage::OpenDestination));
        }
        self.log.borrow_mut().events.push(Event::Open);
        Ok(())
    }

    fn write_header(&mut self) -> Result<(), RetimeError> {
        if self.fail_header {
            return Err(Self::io_error(IoStage::WriteHeader));
        }
        let mut log = self.log.borrow_mut();
        if let Some(time_base) = self.header_time_base {
            for stream in &mut log.streams {
                stream.time_base = time_base;
            }
        }
        log.events.push(Event::Header);
        Ok(())
    }

    fn write_interleaved(&mut self, packet: Packet<u32>) -> Result<(), RetimeError> {
        let mut log = self.log.borrow_mut();
        let writes_so_far = log
            .events
            .iter()
            .filter(|event| matches!(event, Event::Write(_)))
            .count();
        if self.fail_write_at == Some(writes_so_far) {
            return Err(Self::io_error(IoStage::WritePacket));
        }
        log.events.push(Event::Write(packet));
        Ok(())
    }

    fn write_trailer(&mut self) -> Result<(), RetimeError> {
        if self.fail_trailer {
            return Err(Self::io_error(IoStage::WriteTrailer));
        }
        self.log.borrow_mut().events.push(Event::Trailer);
        Ok(())
    }
}
