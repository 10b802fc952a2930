// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, Weak,
};

use async_trait::async_trait;
use bytes::{BufMut, BytesMut};
use dashmap::DashMap;
use log::{error, warn};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
    sync::{oneshot, Mutex},
};

use super::{
    codec::{payload, Frame, FrameCodec},
    protocol::{RemoteStatus, SimCommand},
    ObjectHandle, ProximityReading, SimClient, SimContext,
};
use crate::{
    errors::{Error, RemoteError, Result},
    options::SimConfig,
};

/// The implementation of [`SimClient`] over one TCP connection.
///
/// Requests are correlated with responses by the `seq` header field, so
/// many requests can be outstanding on the single stream. A background
/// task owns the read half and completes pending requests as frames
/// arrive.
pub struct TcpSimClient {
    inner: Arc<Inner>,
}

struct Inner {
    writer: Mutex<OwnedWriteHalf>,
    pending: DashMap<u32, oneshot::Sender<Frame>>,
    next_seq: AtomicU32,
    config: SimConfig,
}

impl Inner {
    fn fail_all_pending(&self) {
        let seqs: Vec<u32> = self.pending.iter().map(|pair| *pair.key()).collect();
        for seq in seqs {
            // Dropping the sender wakes the waiter with a closed channel.
            let _ = self.pending.remove(&seq);
        }
    }
}

impl TcpSimClient {
    /// Connect to the simulator listening on `endpoint` ("host:port").
    pub async fn connect(endpoint: &str, config: SimConfig) -> Result<Self> {
        let connect = TcpStream::connect(endpoint);
        let stream = match tokio::time::timeout(config.connect_timeout, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(Error::Connect(format!(
                    "failed to connect to {}, err:{}",
                    endpoint, e
                )))
            }
            Err(_) => {
                return Err(Error::Connect(format!(
                    "connecting to {} timed out after {:?}",
                    endpoint, config.connect_timeout
                )))
            }
        };
        stream.set_nodelay(true)?;

        let (reader, writer) = stream.into_split();
        let read_buffer_size = config.read_buffer_size;
        let inner = Arc::new(Inner {
            writer: Mutex::new(writer),
            pending: DashMap::new(),
            next_seq: AtomicU32::new(0),
            config,
        });

        tokio::spawn(read_loop(
            reader,
            Arc::downgrade(&inner),
            read_buffer_size,
        ));

        Ok(Self { inner })
    }

    async fn request(
        &self,
        ctx: &SimContext,
        command: SimCommand,
        req_payload: &[u8],
    ) -> Result<Frame> {
        if self.inner.pending.len() >= self.inner.config.max_in_flight {
            return Err(Error::Client(format!(
                "too many in-flight requests (max:{})",
                self.inner.config.max_in_flight
            )));
        }

        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.inner.pending.insert(seq, tx);

        let frame = FrameCodec::encode(seq, command, RemoteStatus::Ok, req_payload);
        {
            let mut writer = self.inner.writer.lock().await;
            if let Err(e) = writer.write_all(&frame).await {
                let _ = self.inner.pending.remove(&seq);
                return Err(Error::Connect(format!(
                    "failed to send {:?} request, err:{}",
                    command, e
                )));
            }
        }

        let timeout = ctx.timeout.unwrap_or(self.inner.config.request_timeout);
        let resp = match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(frame)) => frame,
            Ok(Err(_)) => {
                return Err(Error::Connect(
                    "connection closed before the response arrived".to_string(),
                ))
            }
            Err(_) => {
                let _ = self.inner.pending.remove(&seq);
                return Err(Error::Connect(format!(
                    "{:?} request seq:{} timed out after {:?}",
                    command, seq, timeout
                )));
            }
        };

        if !resp.status.is_ok() {
            return Err(Error::Remote(RemoteError {
                code: resp.status.as_u32(),
                msg: resp.status.to_string(),
            }));
        }

        Ok(resp)
    }
}

async fn read_loop(mut reader: OwnedReadHalf, inner: Weak<Inner>, read_buffer_size: usize) {
    let mut buf = BytesMut::with_capacity(read_buffer_size);

    'conn: loop {
        match reader.read_buf(&mut buf).await {
            Ok(0) => break 'conn,
            Ok(_) => loop {
                match FrameCodec::decode_stream(&mut buf) {
                    Ok(Some(frame)) => {
                        let Some(inner) = inner.upgrade() else {
                            // Client dropped, nobody waits anymore.
                            return;
                        };
                        match inner.pending.remove(&frame.seq) {
                            Some((_, tx)) => {
                                let _ = tx.send(frame);
                            }
                            None => {
                                warn!("dropping response for unknown seq:{}", frame.seq);
                            }
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        // The stream is out of sync, nothing sane can
                        // follow a malformed frame.
                        error!("failed to decode simulator frame, err:{}", e);
                        break 'conn;
                    }
                }
            },
            Err(e) => {
                error!("failed to read from simulator, err:{}", e);
                break 'conn;
            }
        }
    }

    if let Some(inner) = inner.upgrade() {
        inner.fail_all_pending();
    }
}

#[async_trait]
impl SimClient for TcpSimClient {
    async fn start_simulation(&self, ctx: &SimContext) -> Result<()> {
        self.request(ctx, SimCommand::StartSimulation, &[])
            .await
            .map(|_| ())
    }

    async fn stop_simulation(&self, ctx: &SimContext) -> Result<()> {
        self.request(ctx, SimCommand::StopSimulation, &[])
            .await
            .map(|_| ())
    }

    async fn step(&self, ctx: &SimContext) -> Result<()> {
        self.request(ctx, SimCommand::Step, &[]).await.map(|_| ())
    }

    async fn object_handle(&self, ctx: &SimContext, name: &str) -> Result<ObjectHandle> {
        let req = payload::put_name(name);
        let resp = self.request(ctx, SimCommand::GetObjectHandle, &req).await?;
        payload::get_i32(&resp.payload).map(ObjectHandle)
    }

    async fn joint_position(&self, ctx: &SimContext, handle: ObjectHandle) -> Result<f64> {
        let req = handle.raw().to_le_bytes();
        let resp = self.request(ctx, SimCommand::GetJointPosition, &req).await?;
        payload::get_f64(&resp.payload)
    }

    async fn set_joint_target_position(
        &self,
        ctx: &SimContext,
        handle: ObjectHandle,
        position: f64,
    ) -> Result<()> {
        let mut req = BytesMut::with_capacity(12);
        req.put_i32_le(handle.raw());
        req.put_f64_le(position);
        self.request(ctx, SimCommand::SetJointTargetPosition, &req)
            .await
            .map(|_| ())
    }

    async fn set_joint_target_velocity(
        &self,
        ctx: &SimContext,
        handle: ObjectHandle,
        velocity: f64,
    ) -> Result<()> {
        let mut req = BytesMut::with_capacity(12);
        req.put_i32_le(handle.raw());
        req.put_f64_le(velocity);
        self.request(ctx, SimCommand::SetJointTargetVelocity, &req)
            .await
            .map(|_| ())
    }

    async fn read_proximity_sensor(
        &self,
        ctx: &SimContext,
        handle: ObjectHandle,
    ) -> Result<ProximityReading> {
        let req = handle.raw().to_le_bytes();
        let resp = self
            .request(ctx, SimCommand::ReadProximitySensor, &req)
            .await?;

        let raw = &resp.payload;
        if raw.len() < 9 {
            return Err(Error::InsufficientData);
        }
        let detected = raw[0] != 0;
        let distance = payload::get_f64(&raw[1..])?;
        Ok(ProximityReading { detected, distance })
    }
}
