pub trait Greeter {}
pub trait Farewell {}

#[wiregen::singleton(realm = crate::AppModule, cross_wire)]
pub struct English;

impl Greeter for English {}
impl Farewell for English {}

#[wiregen::transient(realm = crate::AppModule, service = Greeter, key = "fr")]
pub struct French;

impl Greeter for French {}
