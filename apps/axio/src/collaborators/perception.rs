//! 感知源
//!
//! - `UdpPerception`：外部检测进程（摄像头 + 手部/人脸检测器）每帧发送一个 JSON 数据报，
//!   格式为 [`Observation`]；超时未收到视为无帧
//! - `SimulatedPerception`：内置目标，沿 Lissajous 曲线移动，偶尔只剩人脸或什么都没有

use axio_sdk::control::{
    BoundingBox, FrameSize, NormalizedPoint, Observation, Perception, PerceptionError,
};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::ErrorKind;
use std::net::UdpSocket;
use std::time::Duration;
use tracing::info;

/// 单个数据报的最大长度
const MAX_DATAGRAM: usize = 64 * 1024;

/// UDP 观测源
pub struct UdpPerception {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl UdpPerception {
    pub fn bind(addr: &str, frame_timeout: Duration) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_read_timeout(Some(frame_timeout.max(Duration::from_millis(1))))?;
        info!("Listening for observations on {}", socket.local_addr()?);
        Ok(Self {
            socket,
            buf: vec![0; MAX_DATAGRAM],
        })
    }

    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.socket.local_addr()
    }
}

impl Perception for UdpPerception {
    fn next_observation(&mut self) -> Result<Option<Observation>, PerceptionError> {
        let len = match self.socket.recv(&mut self.buf) {
            Ok(len) => len,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Ok(None);
            },
            Err(e) => return Err(e.into()),
        };

        let payload = &self.buf[..len];
        if payload.trim_ascii() == b"close" {
            return Err(PerceptionError::Closed);
        }
        serde_json::from_slice(payload)
            .map(Some)
            .map_err(|e| PerceptionError::Decode(e.to_string()))
    }
}

/// 模拟观测源
pub struct SimulatedPerception {
    frame: FrameSize,
    interval: Duration,
    tick: u64,
    rng: StdRng,
}

impl SimulatedPerception {
    pub fn new(frame: FrameSize, interval: Duration) -> Self {
        Self {
            frame,
            interval,
            tick: 0,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    fn generate(&mut self) -> Observation {
        let t = self.tick as f64 * 0.05;
        self.tick += 1;

        let x = 0.5 + 0.4 * (t * 0.7).sin();
        let y = 0.5 + 0.3 * (t * 1.1).cos();
        let jitter = |rng: &mut StdRng| -> f64 { rng.gen_range(-0.01..0.01) };

        let roll: f64 = self.rng.gen_range(0.0..1.0);
        let observation = Observation::empty(self.frame);
        if roll < 0.7 {
            // 21 个关键点，第 9 个为手掌中心
            let mut hand = vec![NormalizedPoint::new(x, y + 0.1); 21];
            hand[9] = NormalizedPoint::new(x + jitter(&mut self.rng), y + jitter(&mut self.rng));
            observation.with_hand(hand)
        } else if roll < 0.9 {
            observation.with_face(BoundingBox {
                xmin: x - 0.1,
                ymin: y - 0.1,
                width: 0.2,
                height: 0.2,
            })
        } else {
            observation
        }
    }
}

impl Perception for SimulatedPerception {
    fn next_observation(&mut self) -> Result<Option<Observation>, PerceptionError> {
        std::thread::sleep(self.interval);
        Ok(Some(self.generate()))
    }
}
