mod gradient_check;
mod graph_backward;
mod graph_basic;
mod graph_forward;
mod layer;
mod node_loss;
mod node_shape;
