//! 网络组件
//!
//! 发送方、瓶颈交换机、接收方，以及在它们之间流动的数据包与 ACK。

mod id;
mod packet;
mod receiver;
mod sender;
mod stats;
mod switch;

pub use id::FlowId;
pub use packet::{Ack, Packet, Relayed};
pub use receiver::Receiver;
pub use sender::{Sender, TimerSlot};
pub use stats::Stats;
pub use switch::{QueueSnapshot, Switch};
