//! FFmpeg-backed frame source and sink.
//!
//! Decoding converts the best video stream to packed RGB24. Encoding writes
//! MPEG-4 Part 2 (`mp4v`) in YUV420P at the source frame rate, reduced to
//! terms the encoder time base accepts.

use crate::constants::encoder::{BITS_PER_PIXEL, CODEC_NAME, MAX_TIME_BASE_TERM};
use crate::error::{Error, Result};
use crate::video::{Frame, FrameRate, FrameSink, FrameSource, VideoGeometry};
use ffmpeg_next as ffmpeg;
use ffmpeg_next::{
    Packet, codec, decoder, encoder, format, frame, media, software::scaling,
    util::rational::Rational,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Output pixel format for the encoder.
const ENCODE_FORMAT: format::Pixel = format::Pixel::YUV420P;
/// Bilinear is plenty for a same-size colorspace conversion.
const SCALE_FLAGS: scaling::Flags = scaling::Flags::BILINEAR;

/// Decodes a video file frame by frame.
pub struct FfmpegSource {
    input: format::context::Input,
    decoder: decoder::Video,
    to_rgb: scaling::Context,
    stream_index: usize,
    geometry: VideoGeometry,
    frame_count: Option<u64>,
    decoded: frame::Video,
    rgb: frame::Video,
    eof_sent: bool,
    next_index: u64,
}

impl FfmpegSource {
    /// Open `path` and prepare a decoder for its best video stream.
    pub fn open(path: &Path) -> Result<Self> {
        ffmpeg::init().map_err(|e| open_error(path, e))?;

        let input = format::input(&path).map_err(|e| open_error(path, e))?;

        let (stream_index, rate, frames, parameters) = {
            let stream = input
                .streams()
                .best(media::Type::Video)
                .ok_or_else(|| open_error(path, "no video stream found"))?;
            let avg = stream.avg_frame_rate();
            let rate = if avg.numerator() > 0 && avg.denominator() > 0 {
                avg
            } else {
                stream.rate()
            };
            (stream.index(), rate, stream.frames(), stream.parameters())
        };

        let decoder = codec::context::Context::from_parameters(parameters)
            .and_then(|ctx| ctx.decoder().video())
            .map_err(|e| open_error(path, e))?;

        let geometry = VideoGeometry::new(
            decoder.width(),
            decoder.height(),
            FrameRate::new(rate.numerator(), rate.denominator()),
        )?;

        let to_rgb = scaling::Context::get(
            decoder.format(),
            geometry.width,
            geometry.height,
            format::Pixel::RGB24,
            geometry.width,
            geometry.height,
            SCALE_FLAGS,
        )
        .map_err(|e| open_error(path, e))?;

        info!(
            width = geometry.width,
            height = geometry.height,
            fps = %geometry.frame_rate,
            pixel_format = ?decoder.format(),
            "opened input video stream"
        );

        Ok(Self {
            input,
            decoder,
            to_rgb,
            stream_index,
            geometry,
            frame_count: u64::try_from(frames).ok().filter(|n| *n > 0),
            decoded: frame::Video::empty(),
            rgb: frame::Video::empty(),
            eof_sent: false,
            next_index: 0,
        })
    }

    /// Send the next packet of our stream to the decoder, or EOF when the
    /// container is exhausted.
    fn feed_decoder(&mut self) -> Result<()> {
        let frame_index = self.next_index;
        for (stream, packet) in self.input.packets() {
            if stream.index() != self.stream_index {
                continue;
            }
            return self
                .decoder
                .send_packet(&packet)
                .map_err(|e| decode_error(frame_index, &e));
        }

        self.eof_sent = true;
        self.decoder
            .send_eof()
            .map_err(|e| decode_error(frame_index, &e))
    }

    fn take_decoded(&mut self) -> Result<Frame> {
        let index = self.next_index;
        self.to_rgb
            .run(&self.decoded, &mut self.rgb)
            .map_err(|e| decode_error(index, &e))?;

        // Compact to a plain Vec<u8> (drop stride padding).
        let width = self.geometry.width as usize;
        let stride = self.rgb.stride(0);
        let raw = self.rgb.data(0);
        let mut data = Vec::with_capacity(self.geometry.frame_len());
        for row in 0..self.geometry.height as usize {
            let start = row * stride;
            data.extend_from_slice(&raw[start..start + width * 3]);
        }

        self.next_index += 1;
        Frame::new(self.geometry.width, self.geometry.height, data, index)
    }
}

impl FrameSource for FfmpegSource {
    fn geometry(&self) -> VideoGeometry {
        self.geometry
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            match self.decoder.receive_frame(&mut self.decoded) {
                Ok(()) => return self.take_decoded().map(Some),
                Err(ffmpeg::Error::Eof) => return Ok(None),
                Err(ffmpeg::Error::Other {
                    errno: ffmpeg::util::error::EAGAIN,
                }) => {
                    if self.eof_sent {
                        return Ok(None);
                    }
                    self.feed_decoder()?;
                }
                Err(e) => return Err(decode_error(self.next_index, &e)),
            }
        }
    }

    fn frame_count_hint(&self) -> Option<u64> {
        self.frame_count
    }
}

/// Encodes RGB24 frames into a video file.
pub struct FfmpegSink {
    output: format::context::Output,
    encoder: encoder::Video,
    to_yuv: scaling::Context,
    rgb: frame::Video,
    yuv: frame::Video,
    stream_index: usize,
    time_base: Rational,
    geometry: VideoGeometry,
    path: PathBuf,
    next_pts: i64,
    finished: bool,
}

impl FfmpegSink {
    /// Create `path`, open an encoder for `geometry` and write the container
    /// header.
    pub fn create(path: &Path, geometry: VideoGeometry) -> Result<Self> {
        ffmpeg::init().map_err(|e| create_error(path, e))?;

        let mut output = format::output(&path).map_err(|e| create_error(path, e))?;
        let global_header = output
            .format()
            .flags()
            .contains(format::flag::Flags::GLOBAL_HEADER);

        let codec = encoder::find(codec::Id::MPEG4)
            .ok_or_else(|| create_error(path, format!("{CODEC_NAME} encoder not found")))?;

        let rate = geometry.frame_rate.limited(MAX_TIME_BASE_TERM);
        if rate != geometry.frame_rate {
            debug!(
                source = %geometry.frame_rate,
                encoded = %rate,
                "frame rate reduced to fit the encoder time base"
            );
        }
        let time_base = Rational::new(rate.den, rate.num);

        let mut builder = codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .map_err(|e| create_error(path, e))?;
        builder.set_width(geometry.width);
        builder.set_height(geometry.height);
        builder.set_format(ENCODE_FORMAT);
        builder.set_time_base(time_base);
        builder.set_frame_rate(Some(Rational::new(rate.num, rate.den)));
        builder.set_bit_rate(target_bit_rate(&geometry));
        if global_header {
            builder.set_flags(codec::flag::Flags::GLOBAL_HEADER);
        }

        let encoder = builder.open_as(codec).map_err(|e| create_error(path, e))?;

        let stream_index = {
            let mut stream = output.add_stream(codec).map_err(|e| create_error(path, e))?;
            stream.set_parameters(&encoder);
            stream.set_time_base(time_base);
            stream.index()
        };

        let to_yuv = scaling::Context::get(
            format::Pixel::RGB24,
            geometry.width,
            geometry.height,
            ENCODE_FORMAT,
            geometry.width,
            geometry.height,
            SCALE_FLAGS,
        )
        .map_err(|e| create_error(path, e))?;

        output
            .write_header()
            .map_err(|e| create_error(path, e))?;

        info!(
            path = %path.display(),
            width = geometry.width,
            height = geometry.height,
            fps = %rate,
            codec = CODEC_NAME,
            "opened output video stream"
        );

        Ok(Self {
            output,
            encoder,
            to_yuv,
            rgb: frame::Video::new(format::Pixel::RGB24, geometry.width, geometry.height),
            yuv: frame::Video::empty(),
            stream_index,
            time_base,
            geometry,
            path: path.to_path_buf(),
            next_pts: 0,
            finished: false,
        })
    }

    /// Move every packet the encoder has ready into the muxer.
    fn drain_packets(&mut self, frame_index: u64) -> Result<()> {
        let mut packet = Packet::empty();
        loop {
            match self.encoder.receive_packet(&mut packet) {
                Ok(()) => {}
                Err(
                    ffmpeg::Error::Eof
                    | ffmpeg::Error::Other {
                        errno: ffmpeg::util::error::EAGAIN,
                    },
                ) => return Ok(()),
                Err(e) => return Err(encode_error(frame_index, &e)),
            }
            let out_time_base = self
                .output
                .stream(self.stream_index)
                .map_or(self.time_base, |s| s.time_base());
            packet.set_stream(self.stream_index);
            packet.rescale_ts(self.time_base, out_time_base);
            packet
                .write_interleaved(&mut self.output)
                .map_err(|e| encode_error(frame_index, &e))?;
        }
    }
}

impl FrameSink for FfmpegSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        frame.check_geometry(&self.geometry)?;

        let row_len = self.geometry.width as usize * 3;
        let stride = self.rgb.stride(0);
        let plane = self.rgb.data_mut(0);
        for (row, src) in frame.data().chunks_exact(row_len).enumerate() {
            let start = row * stride;
            plane[start..start + row_len].copy_from_slice(src);
        }

        self.to_yuv
            .run(&self.rgb, &mut self.yuv)
            .map_err(|e| encode_error(frame.index, &e))?;
        self.yuv.set_pts(Some(self.next_pts));
        self.next_pts += 1;

        self.encoder
            .send_frame(&self.yuv)
            .map_err(|e| encode_error(frame.index, &e))?;
        self.drain_packets(frame.index)
    }

    fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }

        #[allow(clippy::cast_sign_loss)]
        let written = self.next_pts as u64;
        self.encoder
            .send_eof()
            .map_err(|e| encode_error(written, &e))?;
        self.drain_packets(written)?;
        self.output
            .write_trailer()
            .map_err(|e| encode_error(written, &e))?;
        self.finished = true;

        debug!(frames = written, path = %self.path.display(), "output finalized");
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if !self.finished {
            debug!(path = %self.path.display(), "output closed before finalization");
        }
    }
}

/// Bit rate giving roughly constant quality across resolutions.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn target_bit_rate(geometry: &VideoGeometry) -> usize {
    let pixels = f64::from(geometry.width) * f64::from(geometry.height);
    (pixels * geometry.frame_rate.as_f64() * BITS_PER_PIXEL) as usize
}

fn open_error(
    path: &Path,
    source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> Error {
    Error::VideoOpen {
        path: path.to_path_buf(),
        source: source.into(),
    }
}

fn create_error(
    path: &Path,
    source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> Error {
    Error::VideoCreate {
        path: path.to_path_buf(),
        source: source.into(),
    }
}

fn decode_error(frame_index: u64, error: &ffmpeg::Error) -> Error {
    Error::VideoDecode {
        frame_index,
        reason: error.to_string(),
    }
}

fn encode_error(frame_index: u64, error: &ffmpeg::Error) -> Error {
    Error::VideoEncode {
        frame_index,
        reason: error.to_string(),
    }
}
