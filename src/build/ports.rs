//! Connection tag → numeric port tables.

use crate::graph::{DestinationConnection, OriginConnection};

pub fn source_port(tag: OriginConnection) -> u32 {
    match tag {
        OriginConnection::Join | OriginConnection::True => 1,
        OriginConnection::Left | OriginConnection::False => 2,
        OriginConnection::Right => 3,
        OriginConnection::Output | OriginConnection::Other => 1,
    }
}

pub fn dest_port(tag: DestinationConnection) -> u32 {
    match tag {
        DestinationConnection::Left | DestinationConnection::Targets => 1,
        DestinationConnection::Right | DestinationConnection::Source => 2,
        DestinationConnection::Input | DestinationConnection::Other => 1,
    }
}
